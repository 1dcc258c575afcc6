// Copyright (C) 2022 Aventus Network Services (UK) Ltd.

use crate::NATIVE_DECIMALS;

#[derive(Debug, PartialEq, Eq)]
pub enum AmountError {
    Empty,
    InvalidDigit,
    TooManyDecimals,
    Overflow,
}

impl std::fmt::Display for AmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AmountError::Empty => write!(f, "amount is empty"),
            AmountError::InvalidDigit => write!(f, "amount contains an invalid digit"),
            AmountError::TooManyDecimals =>
                write!(f, "amount has more than {} decimal places", NATIVE_DECIMALS),
            AmountError::Overflow => write!(f, "amount does not fit in 128 bits of wei"),
        }
    }
}

impl std::error::Error for AmountError {}

/// Converts a decimal amount of native units (e.g. `"0.1"` ether) into its smallest
/// denomination (wei).
pub fn parse_native_amount(amount: &str) -> Result<u128, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty)
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(AmountError::Empty)
    }
    if fraction.len() > NATIVE_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals)
    }

    let unit = 10u128.pow(NATIVE_DECIMALS);
    let whole_value = parse_digits(whole)?.checked_mul(unit).ok_or(AmountError::Overflow)?;

    let padding = 10u128.pow(NATIVE_DECIMALS - fraction.len() as u32);
    let fraction_value = parse_digits(fraction)?.checked_mul(padding).ok_or(AmountError::Overflow)?;

    whole_value.checked_add(fraction_value).ok_or(AmountError::Overflow)
}

fn parse_digits(digits: &str) -> Result<u128, AmountError> {
    digits.chars().try_fold(0u128, |acc, c| {
        let digit = c.to_digit(10).ok_or(AmountError::InvalidDigit)?;
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u128::from(digit)))
            .ok_or(AmountError::Overflow)
    })
}

#[cfg(test)]
#[path = "tests/test_amount.rs"]
mod test_amount;
