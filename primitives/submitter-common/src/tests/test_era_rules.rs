#[cfg(test)]
use super::*;

#[test]
fn target_era_is_always_the_next_era() {
    for index in [0, 1, 5, 41, 1_000, EraIndex::MAX - 1] {
        assert_eq!(target_era_for(index), index as u64 + 1);
    }
}

#[test]
fn target_era_does_not_overflow_on_max_era_index() {
    assert_eq!(target_era_for(EraIndex::MAX), EraIndex::MAX as u64 + 1);
}

#[test]
fn only_the_final_session_window_is_eligible() {
    let sessions_per_era = 4;
    let era_start_session = 10;

    for session in [10, 11, 12] {
        assert!(!is_last_session(session, era_start_session, sessions_per_era));
    }
    for session in [13, 14, 20] {
        assert!(is_last_session(session, era_start_session, sessions_per_era));
    }
}

#[test]
fn single_session_eras_are_always_eligible() {
    assert!(is_last_session(7, 7, 1));
}

#[test]
fn zero_sessions_per_era_does_not_underflow() {
    assert!(is_last_session(0, 0, 0));
}

#[test]
fn eligibility_saturates_near_max_session_index() {
    assert!(!is_last_session(SessionIndex::MAX - 1, SessionIndex::MAX - 1, 4));
    assert!(is_last_session(SessionIndex::MAX, SessionIndex::MAX - 1, 4));
}

#[test]
fn active_era_info_decodes_from_scale() {
    let encoded = EraDescriptor { index: 5, start: Some(1_700_000_000_000) }.encode();
    // u32 index, then Option<u64> with a `Some` tag
    assert_eq!(encoded.len(), 4 + 1 + 8);

    let decoded = EraDescriptor::decode(&mut &encoded[..]).expect("valid encoding");
    assert_eq!(decoded.index, 5);
    assert_eq!(decoded.start, Some(1_700_000_000_000));
    assert_eq!(target_era_for(decoded.index), 6);
}

#[test]
fn active_era_without_start_decodes() {
    let raw = [7u8, 0, 0, 0, 0];
    let decoded = EraDescriptor::decode(&mut &raw[..]).expect("valid encoding");
    assert_eq!(decoded, EraDescriptor { index: 7, start: None });
}
