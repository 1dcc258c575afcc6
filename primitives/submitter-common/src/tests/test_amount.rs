#[cfg(test)]
use super::*;

const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

#[test]
fn default_fees_convert_to_wei() {
    assert_eq!(parse_native_amount(crate::DEFAULT_EXECUTION_FEE), Ok(ONE_ETHER / 10));
    assert_eq!(parse_native_amount(crate::DEFAULT_RELAYER_FEE), Ok(ONE_ETHER / 5));
}

#[test]
fn whole_and_fractional_amounts_convert() {
    assert_eq!(parse_native_amount("1"), Ok(ONE_ETHER));
    assert_eq!(parse_native_amount("1.5"), Ok(ONE_ETHER + ONE_ETHER / 2));
    assert_eq!(parse_native_amount(".25"), Ok(ONE_ETHER / 4));
    assert_eq!(parse_native_amount("2."), Ok(2 * ONE_ETHER));
    assert_eq!(parse_native_amount(" 0 "), Ok(0));
}

#[test]
fn smallest_denomination_is_accepted() {
    assert_eq!(parse_native_amount("0.000000000000000001"), Ok(1));
}

#[test]
fn more_than_eighteen_decimals_is_rejected() {
    assert_eq!(parse_native_amount("0.0000000000000000001"), Err(AmountError::TooManyDecimals));
}

#[test]
fn malformed_amounts_are_rejected() {
    assert_eq!(parse_native_amount(""), Err(AmountError::Empty));
    assert_eq!(parse_native_amount("."), Err(AmountError::Empty));
    assert_eq!(parse_native_amount("-1"), Err(AmountError::InvalidDigit));
    assert_eq!(parse_native_amount("0.1eth"), Err(AmountError::InvalidDigit));
    assert_eq!(parse_native_amount("1.2.3"), Err(AmountError::InvalidDigit));
}

#[test]
fn amounts_beyond_u128_are_rejected() {
    assert_eq!(parse_native_amount("1000000000000000000000"), Err(AmountError::Overflow));
}
