//! Persistence interfaces consumed by the payroll services.
//!
//! The engine does not own a database. Callers supply implementations of
//! [`PayPersonStore`], [`EmployeeStore`] and [`RecordLocks`]; the crate ships
//! [`InMemoryStore`], which implements all three.
//!
//! Every read-modify-write of a pay person runs inside
//! [`RecordLocks::with_record_lock`], so an implementation must serialize
//! callers holding the same id. Accumulating updates are lost otherwise.

mod memory;

use std::sync::Arc;

use crate::error::PayrollResult;
use crate::models::{EmployeeId, EmployeeRecord, PayPerson, PayPersonId};

pub use memory::InMemoryStore;

/// Storage of [`PayPerson`] records.
pub trait PayPersonStore {
    /// Loads a pay person by id.
    fn get(&self, id: &PayPersonId) -> PayrollResult<Option<PayPerson>>;

    /// Inserts or replaces a pay person, returning the stored value.
    fn save(&self, person: PayPerson) -> PayrollResult<PayPerson>;

    /// Removes a pay person. Removing a missing id is not an error.
    fn delete(&self, id: &PayPersonId) -> PayrollResult<()>;

    /// Finds the pay person derived from an employee record.
    fn find_by_employee_id(&self, employee_id: EmployeeId) -> PayrollResult<Option<PayPerson>>;

    /// Whether a pay person exists for an employee record.
    fn exists_by_employee_id(&self, employee_id: EmployeeId) -> PayrollResult<bool> {
        self.find_by_employee_id(employee_id).map(|p| p.is_some())
    }

    /// Loads every pay person.
    fn all(&self) -> PayrollResult<Vec<PayPerson>>;
}

/// Storage of external [`EmployeeRecord`]s.
pub trait EmployeeStore {
    /// Loads an employee by id.
    fn get_employee(&self, id: EmployeeId) -> PayrollResult<Option<EmployeeRecord>>;

    /// Inserts or replaces an employee record.
    fn save_employee(&self, employee: EmployeeRecord) -> PayrollResult<EmployeeRecord>;

    /// Removes an employee record. Removing a missing id is not an error.
    fn delete_employee(&self, id: EmployeeId) -> PayrollResult<()>;

    /// Loads every employee record.
    fn all_employees(&self) -> PayrollResult<Vec<EmployeeRecord>>;
}

/// Scoped per-record mutual exclusion.
pub trait RecordLocks {
    /// Runs `f` while holding the lock for `id`.
    fn with_record_lock<T, F>(&self, id: &PayPersonId, f: F) -> PayrollResult<T>
    where
        F: FnOnce() -> PayrollResult<T>;
}

impl<S: PayPersonStore + ?Sized> PayPersonStore for Arc<S> {
    fn get(&self, id: &PayPersonId) -> PayrollResult<Option<PayPerson>> {
        (**self).get(id)
    }

    fn save(&self, person: PayPerson) -> PayrollResult<PayPerson> {
        (**self).save(person)
    }

    fn delete(&self, id: &PayPersonId) -> PayrollResult<()> {
        (**self).delete(id)
    }

    fn find_by_employee_id(&self, employee_id: EmployeeId) -> PayrollResult<Option<PayPerson>> {
        (**self).find_by_employee_id(employee_id)
    }

    fn exists_by_employee_id(&self, employee_id: EmployeeId) -> PayrollResult<bool> {
        (**self).exists_by_employee_id(employee_id)
    }

    fn all(&self) -> PayrollResult<Vec<PayPerson>> {
        (**self).all()
    }
}

impl<S: EmployeeStore + ?Sized> EmployeeStore for Arc<S> {
    fn get_employee(&self, id: EmployeeId) -> PayrollResult<Option<EmployeeRecord>> {
        (**self).get_employee(id)
    }

    fn save_employee(&self, employee: EmployeeRecord) -> PayrollResult<EmployeeRecord> {
        (**self).save_employee(employee)
    }

    fn delete_employee(&self, id: EmployeeId) -> PayrollResult<()> {
        (**self).delete_employee(id)
    }

    fn all_employees(&self) -> PayrollResult<Vec<EmployeeRecord>> {
        (**self).all_employees()
    }
}

impl<S: RecordLocks> RecordLocks for Arc<S> {
    fn with_record_lock<T, F>(&self, id: &PayPersonId, f: F) -> PayrollResult<T>
    where
        F: FnOnce() -> PayrollResult<T>,
    {
        (**self).with_record_lock(id, f)
    }
}
