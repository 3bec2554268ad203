//! Exact decimal scaling between human amounts and smallest units
//!
//! Amounts such as "1.5" are scaled by working on the decimal string itself:
//! the digits are shifted by `decimals` places and parsed as an integer.
//! No floating-point value is ever produced, so 18-decimal amounts are exact.

use alloy_primitives::U256;
use thiserror::Error;

use crate::types::constants::MAX_DECIMALS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a non-negative decimal number")]
    Malformed(String),

    #[error("'{amount}' has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },

    #[error("'{0}' does not fit in uint256")]
    Overflow(String),

    #[error("precision {0} exceeds the maximum of 77 decimals")]
    UnsupportedDecimals(u8),
}

/// Scale a human-readable amount to the smallest unit.
///
/// `parse_units("1.5", 18)` is exactly `1_500_000_000_000_000_000`.
/// Trailing zeros beyond `decimals` are accepted ("1.50" with 1 decimal);
/// any other excess precision is an error rather than a silent truncation.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    if decimals > MAX_DECIMALS {
        return Err(UnitsError::UnsupportedDecimals(decimals));
    }

    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((int_part, frac_part)) => {
            if frac_part.is_empty() {
                return Err(UnitsError::Malformed(amount.to_string()));
            }
            (int_part, frac_part)
        }
        None => (amount, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if int_part.is_empty() || !is_digits(int_part) || !is_digits(frac_part) {
        return Err(UnitsError::Malformed(amount.to_string()));
    }

    let frac_part = if frac_part.len() > decimals as usize {
        let (kept, excess) = frac_part.split_at(decimals as usize);
        if excess.chars().any(|c| c != '0') {
            return Err(UnitsError::TooPrecise {
                amount: amount.to_string(),
                decimals,
            });
        }
        kept
    } else {
        frac_part
    };

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in frac_part.len()..decimals as usize {
        digits.push('0');
    }

    U256::from_str_radix(&digits, 10).map_err(|_| UnitsError::Overflow(amount.to_string()))
}

/// Render a smallest-unit value as a human-readable decimal string.
/// Trailing fractional zeros are dropped ("1.5", not "1.500000000000000000").
pub fn format_units(value: U256, decimals: u8) -> String {
    let raw = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return raw;
    }

    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - raw.len()), raw)
    } else {
        raw
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn test_fractional_amount_is_exact() {
        assert_eq!(parse_units("1.5", 18).unwrap(), u("1500000000000000000"));
        assert_eq!(parse_units("0.1", 18).unwrap(), u("100000000000000000"));
        assert_eq!(parse_units("3", 18).unwrap(), u("3000000000000000000"));
    }

    #[test]
    fn test_full_precision_digits() {
        // 0.1 + 0.2 style inputs that binary floats cannot represent
        assert_eq!(
            parse_units("0.300000000000000001", 18).unwrap(),
            u("300000000000000001")
        );
        assert_eq!(
            parse_units("123456789.123456789123456789", 18).unwrap(),
            u("123456789123456789123456789")
        );
    }

    #[test]
    fn test_large_whole_amounts() {
        assert_eq!(
            parse_units("1000000", 18).unwrap(),
            u("1000000000000000000000000")
        );
        assert_eq!(parse_units("1000000", 0).unwrap(), U256::from(1_000_000u64));
    }

    #[test]
    fn test_trailing_zeros_beyond_precision() {
        assert_eq!(parse_units("1.50", 1).unwrap(), U256::from(15u64));
        assert_eq!(
            parse_units("2.5000", 2),
            Ok(U256::from(250u64))
        );
    }

    #[test]
    fn test_excess_precision_rejected() {
        assert!(matches!(
            parse_units("1.25", 1),
            Err(UnitsError::TooPrecise { decimals: 1, .. })
        ));
        assert!(matches!(
            parse_units("0.0000000000000000001", 18),
            Err(UnitsError::TooPrecise { .. })
        ));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(parse_units("", 18), Err(UnitsError::Empty));
        assert!(matches!(parse_units("-1", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1.", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units(".5", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1e18", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1.2.3", 18), Err(UnitsError::Malformed(_))));
    }

    #[test]
    fn test_overflow_and_decimals_limit() {
        let huge = "1".repeat(79);
        assert!(matches!(parse_units(&huge, 0), Err(UnitsError::Overflow(_))));
        assert_eq!(parse_units("1", 78), Err(UnitsError::UnsupportedDecimals(78)));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(u("1500000000000000000"), 18), "1.5");
        assert_eq!(format_units(u("100000000000000000"), 18), "0.1");
        assert_eq!(format_units(u("3000000000000000000"), 18), "3");
        assert_eq!(format_units(U256::from(5u64), 18), "0.000000000000000005");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
    }
}
