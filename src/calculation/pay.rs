//! Derivation of annual and monthly gross and net pay.

use rust_decimal::Decimal;

use super::rounding::{monthly_amount, round_cents, round_whole};
use super::tax::TaxEngine;
use crate::error::PayrollResult;
use crate::models::{PayPerson, ensure_non_negative};

/// The pay figures derived from a salary, deductions and rebate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayFigures {
    /// Annual gross salary, rounded to whole units.
    pub salary: Decimal,
    /// Tax owed for the year (unrounded).
    pub tax: Decimal,
    /// Annual net salary.
    pub salary_after_tax_per_year: Decimal,
    /// Monthly gross salary.
    pub salary_per_month: Decimal,
    /// Monthly net salary.
    pub salary_after_tax_per_month: Decimal,
}

impl PayFigures {
    /// Writes the figures onto a pay person.
    pub fn apply_to(&self, person: &mut PayPerson) {
        person.salary = self.salary;
        person.salary_after_tax_per_year = self.salary_after_tax_per_year;
        person.salary_per_month = self.salary_per_month;
        person.salary_after_tax_per_month = self.salary_after_tax_per_month;
    }
}

/// Derives gross and net pay figures.
///
/// Net annual pay is `max(salary - tax, 0)`. Annual figures are rounded
/// half-up to whole units before the monthly figures are derived from them.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{TaxEngine, derive_pay};
/// use rust_decimal::Decimal;
///
/// let figures = derive_pay(
///     &TaxEngine::builtin(),
///     Decimal::from(1_000_000),
///     Decimal::ZERO,
///     Decimal::ZERO,
/// )
/// .unwrap();
/// assert_eq!(figures.salary_after_tax_per_year, Decimal::from(690_481));
/// assert_eq!(figures.salary_after_tax_per_month, Decimal::from(57_540));
/// ```
pub fn derive_pay(
    engine: &TaxEngine,
    salary: Decimal,
    deductions: Decimal,
    rebate: Decimal,
) -> PayrollResult<PayFigures> {
    let tax = engine.compute_tax(salary, deductions, rebate)?;
    let final_annual_pay = (salary - tax).max(Decimal::ZERO);

    Ok(PayFigures {
        salary: round_whole(salary),
        tax,
        salary_after_tax_per_year: round_whole(final_annual_pay),
        salary_per_month: monthly_amount(salary),
        salary_after_tax_per_month: monthly_amount(final_annual_pay),
    })
}

/// Derives the pay figures for a person from its stored inputs.
pub fn derive_pay_for(engine: &TaxEngine, person: &PayPerson) -> PayrollResult<PayFigures> {
    derive_pay(engine, person.salary, person.deductions, person.rebate)
}

/// Unemployment insurance contribution on a salary, rounded to cents.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::uif_contribution;
/// use rust_decimal::Decimal;
///
/// let uif = uif_contribution(Decimal::new(1_234_567, 2), Decimal::new(1, 2)).unwrap();
/// assert_eq!(uif, Decimal::new(12_346, 2));
/// ```
pub fn uif_contribution(salary: Decimal, rate: Decimal) -> PayrollResult<Decimal> {
    ensure_non_negative("salary", salary)?;
    ensure_non_negative("uif_rate", rate)?;
    Ok(round_cents(salary * rate))
}
