#[cfg(test)]
use super::*;
use crate::mock::*;

const AT: u64 = 100;

#[tokio::test]
async fn target_era_is_the_one_after_the_active_era() {
    let setup = TestSetup::new();
    setup.source.set_active_era(5, 20);
    let oracle = setup.oracle();

    let active_era = oracle.active_era(block(AT)).await.unwrap().unwrap();
    assert_eq!(oracle.compute_target_era(&active_era), 6);
}

#[tokio::test]
async fn active_era_is_none_before_the_first_era() {
    let setup = TestSetup::new();
    assert_eq!(setup.oracle().active_era(block(AT)).await.unwrap(), None);
}

#[tokio::test]
async fn missing_external_index_defaults_to_zero() {
    let setup = TestSetup::new();
    let oracle = setup.oracle();
    assert_eq!(oracle.external_index(block(AT)).await.unwrap(), 0);

    setup.source.set_external_index(Some(7));
    assert_eq!(oracle.external_index(block(AT)).await.unwrap(), 7);
}

#[tokio::test]
async fn only_the_final_session_of_the_era_is_eligible() {
    let setup = TestSetup::new();
    setup.source.set_active_era(5, 20);
    let oracle = setup.oracle();
    let era = oracle.active_era(block(AT)).await.unwrap().unwrap();

    for session in 20..23 {
        assert!(!oracle.is_last_session_of_era(&era, session, block(AT)).await.unwrap());
    }
    assert!(oracle.is_last_session_of_era(&era, 23, block(AT)).await.unwrap());
    // Era overran its planned length
    assert!(oracle.is_last_session_of_era(&era, 25, block(AT)).await.unwrap());
}

#[tokio::test]
async fn era_without_start_session_is_never_eligible() {
    let setup = TestSetup::new();
    setup.source.set_active_era_without_start(5);
    let oracle = setup.oracle();
    let era = oracle.active_era(block(AT)).await.unwrap().unwrap();

    assert!(!oracle.is_last_session_of_era(&era, 1_000, block(AT)).await.unwrap());
}

#[tokio::test]
async fn read_failures_propagate() {
    let setup = TestSetup::new();
    setup.source.set_unreachable(true);
    assert!(setup.oracle().active_era(block(AT)).await.is_err());
    assert!(setup.oracle().external_index(block(AT)).await.is_err());
}

#[tokio::test]
async fn era_facts_are_read_at_the_requested_block() {
    let setup = TestSetup::new();
    setup.source.set_active_era(5, 20);
    setup.source.set_external_index(Some(5));
    setup.source.snapshot_at(block(AT));

    setup.source.set_active_era(6, 24);
    setup.source.set_external_index(Some(6));
    let oracle = setup.oracle();

    let era = oracle.active_era(block(AT)).await.unwrap().unwrap();
    assert_eq!(era.index, 5);
    assert_eq!(oracle.external_index(block(AT)).await.unwrap(), 5);
    assert!(oracle.is_last_session_of_era(&era, 23, block(AT)).await.unwrap());

    assert_eq!(oracle.active_era(block(AT + 1)).await.unwrap().unwrap().index, 6);
    assert_eq!(oracle.external_index(block(AT + 1)).await.unwrap(), 6);
    assert_eq!(setup.source.read_blocks()[..3], [block(AT), block(AT), block(AT)]);
}
