//! In-memory store backed by hash maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{PayrollError, PayrollResult};
use crate::models::{EmployeeId, EmployeeRecord, PayPerson, PayPersonId};

use super::{EmployeeStore, PayPersonStore, RecordLocks};

/// Thread-safe in-memory implementation of every store interface.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPerson;
/// use payroll_engine::store::{InMemoryStore, PayPersonStore};
/// use rust_decimal::Decimal;
///
/// let store = InMemoryStore::new();
/// let person = store.save(PayPerson::new("Ann", "Smith", "Acme", Decimal::from(1000)))?;
/// assert_eq!(store.get(&person.id)?, Some(person));
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    people: RwLock<HashMap<PayPersonId, PayPerson>>,
    employees: RwLock<BTreeMap<EmployeeId, EmployeeRecord>>,
    locks: Mutex<HashMap<PayPersonId, Arc<Mutex<()>>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pay people.
    pub fn len(&self) -> usize {
        self.people.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Whether no pay people are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<E>(_: E) -> PayrollError {
    PayrollError::Store {
        message: "in-memory store lock poisoned".to_string(),
    }
}

impl PayPersonStore for InMemoryStore {
    fn get(&self, id: &PayPersonId) -> PayrollResult<Option<PayPerson>> {
        Ok(self.people.read().map_err(poisoned)?.get(id).cloned())
    }

    fn save(&self, person: PayPerson) -> PayrollResult<PayPerson> {
        self.people
            .write()
            .map_err(poisoned)?
            .insert(person.id, person.clone());
        Ok(person)
    }

    fn delete(&self, id: &PayPersonId) -> PayrollResult<()> {
        self.people.write().map_err(poisoned)?.remove(id);
        Ok(())
    }

    fn find_by_employee_id(&self, employee_id: EmployeeId) -> PayrollResult<Option<PayPerson>> {
        Ok(self
            .people
            .read()
            .map_err(poisoned)?
            .values()
            .find(|p| p.employee_id == Some(employee_id))
            .cloned())
    }

    fn all(&self) -> PayrollResult<Vec<PayPerson>> {
        let mut people: Vec<PayPerson> =
            self.people.read().map_err(poisoned)?.values().cloned().collect();
        people.sort_by_key(|p| p.id);
        Ok(people)
    }
}

impl EmployeeStore for InMemoryStore {
    fn get_employee(&self, id: EmployeeId) -> PayrollResult<Option<EmployeeRecord>> {
        Ok(self.employees.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn save_employee(&self, employee: EmployeeRecord) -> PayrollResult<EmployeeRecord> {
        self.employees
            .write()
            .map_err(poisoned)?
            .insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn delete_employee(&self, id: EmployeeId) -> PayrollResult<()> {
        self.employees.write().map_err(poisoned)?.remove(&id);
        Ok(())
    }

    fn all_employees(&self) -> PayrollResult<Vec<EmployeeRecord>> {
        Ok(self
            .employees
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect())
    }
}

impl RecordLocks for InMemoryStore {
    fn with_record_lock<T, F>(&self, id: &PayPersonId, f: F) -> PayrollResult<T>
    where
        F: FnOnce() -> PayrollResult<T>,
    {
        let lock = {
            let mut locks = self.locks.lock().map_err(poisoned)?;
            Arc::clone(locks.entry(*id).or_default())
        };
        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(err) => Err(poisoned(err)),
        };

        // Handles are only cloned under the table lock, so a count of two
        // (table plus ours) means nobody else holds or waits for this id.
        let mut locks = self.locks.lock().map_err(poisoned)?;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
        result
    }
}
