//! PayPerson model and related types.
//!
//! A [`PayPerson`] is the payroll view of an employee: gross salary inputs,
//! the derived net figures, and the leave counters tracked across periods.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::employee::EmployeeId;
use crate::error::{PayrollError, PayrollResult};

/// Opaque identifier of a [`PayPerson`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayPersonId(Uuid);

impl PayPersonId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic identifier for the pay person derived from an employee
    /// record, so repeated derivations address the same record.
    pub fn for_employee(employee_id: EmployeeId) -> Self {
        const DERIVED_PREFIX: u64 = 0x7061_7970_6572_736f;
        Self(Uuid::from_u64_pair(DERIVED_PREFIX, employee_id.get() as u64))
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PayPersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PayPersonId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for PayPersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Payroll record for a single person.
///
/// Money fields are whole currency units once the record has been through
/// [`crate::service::PayrollCalculator::recompute_pay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayPerson {
    /// Unique identifier of this record.
    pub id: PayPersonId,
    /// Weak reference to the employee record this person was derived from.
    pub employee_id: Option<EmployeeId>,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Employing company.
    pub company: String,
    /// Annual gross salary.
    pub salary: Decimal,
    /// Annual net salary.
    #[serde(default)]
    pub salary_after_tax_per_year: Decimal,
    /// Monthly gross salary.
    #[serde(default)]
    pub salary_per_month: Decimal,
    /// Monthly net salary.
    #[serde(default)]
    pub salary_after_tax_per_month: Decimal,
    /// Cumulative deductions subtracted from taxable income.
    #[serde(default)]
    pub deductions: Decimal,
    /// Cumulative rebate credited against computed tax.
    #[serde(default)]
    pub rebate: Decimal,
    /// First day of the current leave period.
    pub leave_start_date: Option<NaiveDate>,
    /// Last day (inclusive) of the current leave period.
    pub leave_end_date: Option<NaiveDate>,
    /// Whether the current leave period is paid.
    #[serde(default)]
    pub is_leave_paid: bool,
    /// Remaining leave entitlement for the year.
    #[serde(default)]
    pub leave_days_left_per_year: Decimal,
    /// Leave days consumed this year, rolled up from the monthly counter.
    #[serde(default)]
    pub leave_days_taken_per_year: u32,
    /// Leave days consumed in the current period.
    #[serde(default)]
    pub leave_days_taken_per_month: u32,
}

impl PayPerson {
    /// Creates a pay person with the given annual gross salary and all
    /// derived, cumulative and leave fields zeroed.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::PayPerson;
    /// use rust_decimal::Decimal;
    ///
    /// let person = PayPerson::new("Thandi", "Nkosi", "Acme", Decimal::from(480_000));
    /// assert_eq!(person.salary, Decimal::from(480_000));
    /// assert!(person.employee_id.is_none());
    /// assert_eq!(person.deductions, Decimal::ZERO);
    /// ```
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        company: impl Into<String>,
        salary: Decimal,
    ) -> Self {
        Self {
            id: PayPersonId::new(),
            employee_id: None,
            name: name.into(),
            surname: surname.into(),
            company: company.into(),
            salary,
            salary_after_tax_per_year: Decimal::ZERO,
            salary_per_month: Decimal::ZERO,
            salary_after_tax_per_month: Decimal::ZERO,
            deductions: Decimal::ZERO,
            rebate: Decimal::ZERO,
            leave_start_date: None,
            leave_end_date: None,
            is_leave_paid: false,
            leave_days_left_per_year: Decimal::ZERO,
            leave_days_taken_per_year: 0,
            leave_days_taken_per_month: 0,
        }
    }

    /// Links this record to an employee.
    pub fn with_employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    /// Returns the leave period when both dates are set.
    pub fn leave_period(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.leave_start_date.zip(self.leave_end_date)
    }

    /// Checks the input fields a caller is allowed to set.
    ///
    /// Money and leave inputs must be non-negative and the leave period,
    /// when complete, must not end before it starts.
    pub fn validate(&self) -> PayrollResult<()> {
        ensure_non_negative("salary", self.salary)?;
        ensure_non_negative("deductions", self.deductions)?;
        ensure_non_negative("rebate", self.rebate)?;
        ensure_non_negative("leave_days_left_per_year", self.leave_days_left_per_year)?;
        ensure_leave_period(self.leave_start_date, self.leave_end_date)
    }
}

/// Incoming values applied to an existing [`PayPerson`] by
/// [`crate::service::PayrollCalculator::upsert`].
///
/// `deductions` and `rebate` are increments added onto the stored totals;
/// every other field replaces the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayPersonUpdate {
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Employing company.
    pub company: String,
    /// Annual gross salary.
    pub salary: Decimal,
    /// First day of the leave period.
    pub leave_start_date: Option<NaiveDate>,
    /// Last day (inclusive) of the leave period.
    pub leave_end_date: Option<NaiveDate>,
    /// Leave days taken in the period being closed.
    #[serde(default)]
    pub leave_days_taken_per_month: u32,
    /// Remaining leave entitlement.
    #[serde(default)]
    pub leave_days_left_per_year: Decimal,
    /// Whether the leave period is paid.
    #[serde(default)]
    pub is_leave_paid: bool,
    /// Deductions to add to the running total.
    #[serde(default)]
    pub deductions: Decimal,
    /// Rebate to add to the running total.
    #[serde(default)]
    pub rebate: Decimal,
}

impl PayPersonUpdate {
    /// Builds an update that restates the current values of `person` with
    /// zero increments and no monthly leave.
    pub fn from_person(person: &PayPerson) -> Self {
        Self {
            name: person.name.clone(),
            surname: person.surname.clone(),
            company: person.company.clone(),
            salary: person.salary,
            leave_start_date: person.leave_start_date,
            leave_end_date: person.leave_end_date,
            leave_days_taken_per_month: 0,
            leave_days_left_per_year: person.leave_days_left_per_year,
            is_leave_paid: person.is_leave_paid,
            deductions: Decimal::ZERO,
            rebate: Decimal::ZERO,
        }
    }

    /// Checks that all amounts are non-negative and the leave period is ordered.
    pub fn validate(&self) -> PayrollResult<()> {
        ensure_non_negative("salary", self.salary)?;
        ensure_non_negative("deductions", self.deductions)?;
        ensure_non_negative("rebate", self.rebate)?;
        ensure_non_negative("leave_days_left_per_year", self.leave_days_left_per_year)?;
        ensure_leave_period(self.leave_start_date, self.leave_end_date)
    }
}

/// Rejects negative values instead of clamping them.
pub(crate) fn ensure_non_negative(field: &'static str, value: Decimal) -> PayrollResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PayrollError::invalid(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_leave_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> PayrollResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(PayrollError::invalid(
                "leave_end_date",
                format!("{} is before leave start {}", end, start),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_person_has_zeroed_derived_fields() {
        let person = PayPerson::new("Ann", "Smith", "Acme", dec("300000"));
        assert_eq!(person.salary_after_tax_per_year, Decimal::ZERO);
        assert_eq!(person.salary_per_month, Decimal::ZERO);
        assert_eq!(person.leave_days_taken_per_year, 0);
        assert!(person.leave_period().is_none());
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = PayPerson::new("A", "A", "Acme", Decimal::ZERO);
        let b = PayPerson::new("B", "B", "Acme", Decimal::ZERO);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_derived_ids_are_stable_per_employee() {
        let a = PayPersonId::for_employee(EmployeeId::new(4));
        assert_eq!(a, PayPersonId::for_employee(EmployeeId::new(4)));
        assert_ne!(a, PayPersonId::for_employee(EmployeeId::new(5)));
    }

    #[test]
    fn test_validate_rejects_negative_salary() {
        let person = PayPerson::new("Ann", "Smith", "Acme", dec("-1"));
        match person.validate() {
            Err(PayrollError::InvalidArgument { field, .. }) => assert_eq!(field, "salary"),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_reversed_leave_period() {
        let mut person = PayPerson::new("Ann", "Smith", "Acme", dec("1000"));
        person.leave_start_date = Some(date(2024, 3, 10));
        person.leave_end_date = Some(date(2024, 3, 9));
        match person.validate() {
            Err(PayrollError::InvalidArgument { field, .. }) => {
                assert_eq!(field, "leave_end_date")
            }
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_single_day_leave() {
        let mut person = PayPerson::new("Ann", "Smith", "Acme", dec("1000"));
        person.leave_start_date = Some(date(2024, 3, 10));
        person.leave_end_date = Some(date(2024, 3, 10));
        assert!(person.validate().is_ok());
    }

    #[test]
    fn test_update_validate_rejects_negative_rebate() {
        let person = PayPerson::new("Ann", "Smith", "Acme", dec("1000"));
        let mut update = PayPersonUpdate::from_person(&person);
        update.rebate = dec("-0.01");
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_validate_rejects_reversed_leave_period() {
        let person = PayPerson::new("Ann", "Smith", "Acme", dec("1000"));
        let mut update = PayPersonUpdate::from_person(&person);
        update.leave_start_date = Some(date(2024, 8, 2));
        update.leave_end_date = Some(date(2024, 8, 1));
        match update.validate() {
            Err(PayrollError::InvalidArgument { field, .. }) => {
                assert_eq!(field, "leave_end_date")
            }
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }

        update.leave_end_date = None;
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_update_from_person_has_zero_increments() {
        let mut person = PayPerson::new("Ann", "Smith", "Acme", dec("1000"));
        person.deductions = dec("50");
        person.leave_days_taken_per_month = 3;
        let update = PayPersonUpdate::from_person(&person);
        assert_eq!(update.deductions, Decimal::ZERO);
        assert_eq!(update.leave_days_taken_per_month, 0);
        assert_eq!(update.salary, dec("1000"));
    }

    #[test]
    fn test_deserialize_pay_person_with_defaults() {
        let json = r#"{
            "id": "6f2c1f5e-8d3b-4a57-9a8e-4c1d2b3a4f5e",
            "employee_id": 12,
            "name": "Ann",
            "surname": "Smith",
            "company": "Acme",
            "salary": "480000",
            "leave_start_date": "2024-03-04",
            "leave_end_date": null
        }"#;

        let person: PayPerson = serde_json::from_str(json).unwrap();
        assert_eq!(person.employee_id, Some(EmployeeId::new(12)));
        assert_eq!(person.salary, dec("480000"));
        assert_eq!(person.leave_start_date, Some(date(2024, 3, 4)));
        assert_eq!(person.deductions, Decimal::ZERO);
        assert!(!person.is_leave_paid);
    }

    #[test]
    fn test_serialize_pay_person_round_trip() {
        let person = PayPerson::new("Ann", "Smith", "Acme", dec("480000"))
            .with_employee(EmployeeId::new(3));
        let json = serde_json::to_string(&person).unwrap();
        let back: PayPerson = serde_json::from_str(&json).unwrap();
        assert_eq!(person, back);
    }
}
