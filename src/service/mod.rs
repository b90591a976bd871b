//! Stateful payroll operations over the store interfaces.
//!
//! [`PayrollCalculator`] owns pay derivation, additive updates, deductions,
//! deletion and the employee migration. [`LeaveLedger`] owns leave periods,
//! accrual and unpaid-leave detection. Both run each read-modify-write under
//! the store's per-record lock.

mod batch;
mod leave;
mod payroll;
mod sync;

pub use batch::{BatchFailure, BatchReport};
pub use leave::LeaveLedger;
pub use payroll::{DeductionOutcome, PayrollCalculator, UpsertOutcome};
pub use sync::EmployeeSync;
