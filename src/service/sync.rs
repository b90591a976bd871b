//! Propagation of pay person changes to the linked employee record.
//!
//! Synchronization always runs after the pay person has been persisted. A
//! failure here is logged and reported to the caller but never rolls back or
//! alters the pay person.

use tracing::{debug, warn};

use crate::calculation::round_whole;
use crate::models::{EmployeeId, PayPerson};
use crate::store::EmployeeStore;

/// Outcome of synchronizing a linked employee record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeSync {
    /// The employee record was updated (or removed, for deletions).
    Synced(EmployeeId),
    /// The pay person has no linked employee.
    NotLinked,
    /// The linked employee record does not exist.
    EmployeeMissing(EmployeeId),
    /// The employee store failed; the pay person is unaffected.
    Failed {
        /// The linked employee.
        employee_id: EmployeeId,
        /// The store error message.
        message: String,
    },
}

impl EmployeeSync {
    /// Returns true unless the employee store failed.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Copies name, surname, salary and company onto the linked employee record.
pub(crate) fn push_to_employee<S: EmployeeStore>(store: &S, person: &PayPerson) -> EmployeeSync {
    let Some(employee_id) = person.employee_id else {
        return EmployeeSync::NotLinked;
    };

    let result = store.get_employee(employee_id).and_then(|found| match found {
        Some(mut employee) => {
            employee.name = person.name.clone();
            employee.surname = person.surname.clone();
            employee.company = person.company.clone();
            employee.salary = round_whole(person.salary);
            store.save_employee(employee).map(|_| true)
        }
        None => Ok(false),
    });

    match result {
        Ok(true) => {
            debug!(employee_id = %employee_id, pay_person_id = %person.id, "Synchronized employee");
            EmployeeSync::Synced(employee_id)
        }
        Ok(false) => EmployeeSync::EmployeeMissing(employee_id),
        Err(err) => {
            warn!(
                employee_id = %employee_id,
                pay_person_id = %person.id,
                error = %err,
                "Employee synchronization failed"
            );
            EmployeeSync::Failed {
                employee_id,
                message: err.to_string(),
            }
        }
    }
}

/// Removes the employee record linked to a deleted pay person.
pub(crate) fn remove_employee<S: EmployeeStore>(store: &S, person: &PayPerson) -> EmployeeSync {
    let Some(employee_id) = person.employee_id else {
        return EmployeeSync::NotLinked;
    };

    let result = store.get_employee(employee_id).and_then(|found| match found {
        Some(_) => store.delete_employee(employee_id).map(|_| true),
        None => Ok(false),
    });

    match result {
        Ok(true) => EmployeeSync::Synced(employee_id),
        Ok(false) => EmployeeSync::EmployeeMissing(employee_id),
        Err(err) => {
            warn!(
                employee_id = %employee_id,
                pay_person_id = %person.id,
                error = %err,
                "Employee removal failed"
            );
            EmployeeSync::Failed {
                employee_id,
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeRecord;
    use crate::store::InMemoryStore;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .save_employee(EmployeeRecord {
                id: EmployeeId::new(1),
                name: "Old".to_string(),
                surname: "Name".to_string(),
                company: "OldCo".to_string(),
                salary: dec("100"),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_push_updates_linked_employee() {
        let store = seeded_store();
        let person = PayPerson::new("Ann", "Smith", "Acme", dec("250000.6"))
            .with_employee(EmployeeId::new(1));

        assert_eq!(
            push_to_employee(&store, &person),
            EmployeeSync::Synced(EmployeeId::new(1))
        );
        let employee = store.get_employee(EmployeeId::new(1)).unwrap().unwrap();
        assert_eq!(employee.name, "Ann");
        assert_eq!(employee.company, "Acme");
        assert_eq!(employee.salary, dec("250001"));
    }

    #[test]
    fn test_push_without_link_is_noop() {
        let store = seeded_store();
        let person = PayPerson::new("Ann", "Smith", "Acme", dec("1"));
        assert_eq!(push_to_employee(&store, &person), EmployeeSync::NotLinked);
        assert_eq!(
            store.get_employee(EmployeeId::new(1)).unwrap().unwrap().name,
            "Old"
        );
    }

    #[test]
    fn test_push_to_missing_employee() {
        let store = seeded_store();
        let person =
            PayPerson::new("Ann", "Smith", "Acme", dec("1")).with_employee(EmployeeId::new(9));
        assert_eq!(
            push_to_employee(&store, &person),
            EmployeeSync::EmployeeMissing(EmployeeId::new(9))
        );
    }

    #[test]
    fn test_remove_employee() {
        let store = seeded_store();
        let person =
            PayPerson::new("Ann", "Smith", "Acme", dec("1")).with_employee(EmployeeId::new(1));
        assert!(remove_employee(&store, &person).is_ok());
        assert!(store.get_employee(EmployeeId::new(1)).unwrap().is_none());
        assert_eq!(
            remove_employee(&store, &person),
            EmployeeSync::EmployeeMissing(EmployeeId::new(1))
        );
    }
}
