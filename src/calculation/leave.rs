//! Leave-day accrual, consumption and payout arithmetic.
//!
//! Leave accrues at a fixed number of days per month. Days taken beyond the
//! remaining annual entitlement plus the current month's accrual are unpaid.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::rounding::MONTHS_PER_YEAR;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{ensure_leave_period, ensure_non_negative};

/// Leave days accrued per year at the given monthly rate.
pub fn annual_entitlement(accrual_per_month: Decimal) -> Decimal {
    accrual_per_month * Decimal::from(MONTHS_PER_YEAR)
}

/// Leave days taken in the current period that are not covered by the
/// remaining entitlement or this period's accrual.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::unpaid_leave_days;
/// use rust_decimal::Decimal;
///
/// let accrual = Decimal::new(15, 1);
/// assert_eq!(unpaid_leave_days(5, Decimal::from(2), accrual), Decimal::new(15, 1));
/// assert_eq!(unpaid_leave_days(3, Decimal::from(2), accrual), Decimal::ZERO);
/// ```
pub fn unpaid_leave_days(
    taken_this_month: u32,
    days_left_per_year: Decimal,
    accrual_per_month: Decimal,
) -> Decimal {
    let excess = Decimal::from(taken_this_month) - (days_left_per_year + accrual_per_month);
    excess.max(Decimal::ZERO)
}

/// Entitlement remaining after the days already rolled up into the year.
pub fn leave_days_left(accrual_per_month: Decimal, taken_per_year: u32) -> Decimal {
    (annual_entitlement(accrual_per_month) - Decimal::from(taken_per_year)).max(Decimal::ZERO)
}

/// Number of calendar days in an inclusive date range.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> PayrollResult<u32> {
    ensure_leave_period(Some(start), Some(end))?;
    let days = (end - start).num_days() + 1;
    u32::try_from(days).map_err(|_| {
        PayrollError::invalid(
            "leave_end_date",
            format!("leave period of {} days is out of range", days),
        )
    })
}

/// The last calendar day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Calendar days of an inclusive leave period that fall in the month in
/// which the period starts.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::leave_days_in_start_month;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
/// assert_eq!(leave_days_in_start_month(start, end).unwrap(), 3);
/// ```
pub fn leave_days_in_start_month(start: NaiveDate, end: NaiveDate) -> PayrollResult<u32> {
    ensure_leave_period(Some(start), Some(end))?;
    inclusive_days(start, end.min(last_day_of_month(start)))
}

/// Value of paying out leave days at a daily rate.
///
/// Fails with `InvalidArgument` if the daily salary is negative.
pub fn payout_value(daily_salary: Decimal, leave_days_to_pay_out: u32) -> PayrollResult<Decimal> {
    ensure_non_negative("daily_salary", daily_salary)?;
    Ok(daily_salary * Decimal::from(leave_days_to_pay_out))
}
