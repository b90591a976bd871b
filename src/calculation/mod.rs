//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions: progressive income
//! tax with rebate, derivation of annual and monthly gross and net pay,
//! unemployment insurance contributions, leave accrual and unpaid-leave
//! detection, leave payouts, and the rounding rules they share.

mod leave;
mod pay;
mod rounding;
mod tax;

pub use leave::{
    annual_entitlement, inclusive_days, last_day_of_month, leave_days_in_start_month,
    leave_days_left, payout_value, unpaid_leave_days,
};
pub use pay::{PayFigures, derive_pay, derive_pay_for, uif_contribution};
pub use rounding::{MONTHS_PER_YEAR, monthly_amount, round_cents, round_whole};
pub use tax::{TaxCalculation, TaxEngine, calculate_tax};
