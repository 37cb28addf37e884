//! Monetary rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places money is stored with.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Total digits a stored money amount may carry, cents included.
pub const MONEY_MAX_DIGITS: u32 = 12;

/// The largest amount a salary, allowance or deduction may hold:
/// 9,999,999,999.99.
pub fn max_money_amount() -> Decimal {
    Decimal::new(10i64.pow(MONEY_MAX_DIGITS) - 1, MONEY_DECIMAL_PLACES)
}

/// Whether an amount fits the stored money range, zero to [`max_money_amount`].
pub fn is_valid_money_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= max_money_amount()
}

/// Rounds an amount to the cent, half away from zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.005").unwrap()).to_string(), "10.01");
/// assert_eq!(round_money(Decimal::from_str("10.004").unwrap()).to_string(), "10.00");
/// assert_eq!(round_money(Decimal::from_str("1000").unwrap()).to_string(), "1000.00");
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    // Always carry two places so "1000" and "1000.00" serialize the same way.
    rounded.rescale(MONEY_DECIMAL_PLACES);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_midpoint_rounds_up() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("0.135")), dec("0.14"));
    }

    #[test]
    fn test_midpoint_negative_rounds_away_from_zero() {
        assert_eq!(round_money(dec("-0.125")), dec("-0.13"));
    }

    #[test]
    fn test_money_range_boundary() {
        assert_eq!(max_money_amount(), dec("9999999999.99"));
        assert!(is_valid_money_amount(dec("9999999999.99")));
        assert!(is_valid_money_amount(Decimal::ZERO));
        assert!(!is_valid_money_amount(dec("10000000000.00")));
        assert!(!is_valid_money_amount(dec("-0.01")));
        assert!(!is_valid_money_amount(Decimal::MAX));
    }

    #[test]
    fn test_scale_is_two_places() {
        assert_eq!(round_money(dec("868")).to_string(), "868.00");
        assert_eq!(round_money(dec("868.0000")).to_string(), "868.00");
    }
}
