//! Monetary rounding helpers.
//!
//! All money is rounded half-up (midpoint away from zero) to whole currency
//! units, except statutory contributions which keep cents.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of pay months in a year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Rounds to whole currency units, half-up.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_whole;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_whole(Decimal::new(25, 1)), Decimal::from(3));
/// assert_eq!(round_whole(Decimal::new(249, 2)), Decimal::from(2));
/// ```
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to cents, half-up.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an annual amount to a monthly one.
///
/// The annual amount is rounded to whole units first, then divided by twelve
/// and rounded again.
pub fn monthly_amount(annual: Decimal) -> Decimal {
    round_whole(round_whole(annual) / Decimal::from(MONTHS_PER_YEAR))
}
