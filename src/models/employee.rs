//! Employee record owned by the external employee store.
//!
//! The engine only reads and synchronizes a handful of fields; the full
//! employee lifecycle is managed outside this crate.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of an employee record in the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(i64);

impl EmployeeId {
    /// Wraps a raw store identifier.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Store identifiers start at 1; zero and negative values are placeholders.
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The subset of an employee record the payroll engine reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Store identifier.
    pub id: EmployeeId,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Employing company.
    pub company: String,
    /// Annual gross salary.
    pub salary: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_id_validity() {
        assert!(EmployeeId::new(1).is_valid());
        assert!(!EmployeeId::new(0).is_valid());
        assert!(!EmployeeId::new(-4).is_valid());
    }

    #[test]
    fn test_deserialize_employee_record() {
        let json = r#"{
            "id": 7,
            "name": "Sipho",
            "surname": "Dlamini",
            "company": "Acme",
            "salary": "250000"
        }"#;

        let employee: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, EmployeeId::new(7));
        assert_eq!(employee.salary, Decimal::from(250_000));
    }

    #[test]
    fn test_employee_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&EmployeeId::new(42)).unwrap(), "42");
    }
}
