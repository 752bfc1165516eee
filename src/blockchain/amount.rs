// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exact conversion between display amounts and base units.
//!
//! All arithmetic is integer; a display string such as `"1.5"` is split on the
//! decimal point and scaled without ever passing through a float.

/// Errors converting a display amount into base units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a plain decimal number")]
    NotANumber,

    #[error("too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("amount overflows base units")]
    Overflow,
}

/// Parse a human-readable, unsigned amount into base units.
///
/// Accepts `"1"`, `"1.5"`, `".5"` and `"1."`. Rejects signs, exponents and
/// anything with more fractional digits than `decimals`.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<u64, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole_str, frac_str) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(AmountError::NotANumber);
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole_str) || !all_digits(frac_str) {
        return Err(AmountError::NotANumber);
    }
    if frac_str.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals(decimals));
    }

    let whole = if whole_str.is_empty() {
        0u128
    } else {
        whole_str.parse::<u128>().map_err(|_| AmountError::Overflow)?
    };

    // Pad with zeros to match decimals
    let padded = format!("{:0<width$}", frac_str, width = decimals as usize);
    let fraction = if padded.is_empty() {
        0u128
    } else {
        padded.parse::<u128>().map_err(|_| AmountError::NotANumber)?
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(AmountError::Overflow)?;

    u64::try_from(total).map_err(|_| AmountError::Overflow)
}

/// Format base units as a human-readable amount, trimming trailing zeros.
pub fn format_amount(amount: u64, decimals: u8) -> String {
    if amount == 0 {
        return "0".to_string();
    }

    let divisor = 10u64.pow(decimals as u32);
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder == 0 {
        return whole.to_string();
    }

    let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
    let trimmed = decimal_str.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}
