//! Stateful pay calculation over stored pay people.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::batch::BatchReport;
use super::sync::{EmployeeSync, push_to_employee, remove_employee};
use crate::calculation::{TaxEngine, derive_pay_for, round_whole, uif_contribution};
use crate::config::PayrollConfig;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    EmployeeId, EmployeeRecord, PayPerson, PayPersonId, PayPersonUpdate, ensure_non_negative,
};
use crate::store::{EmployeeStore, PayPersonStore, RecordLocks};

/// A persisted pay person together with the outcome of synchronizing its
/// linked employee record.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// The pay person as persisted.
    pub person: PayPerson,
    /// What happened to the linked employee record.
    pub employee_sync: EmployeeSync,
}

/// The salary left after a one-off deduction together with the outcome of
/// synchronizing the linked employee record.
#[derive(Debug, Clone, PartialEq)]
pub struct DeductionOutcome {
    /// The new annual salary, rounded to whole units.
    pub salary: Decimal,
    /// What happened to the linked employee record.
    pub employee_sync: EmployeeSync,
}

/// Recomputes and persists pay figures.
///
/// Every write of a pay person runs under the store's per-record lock and
/// is followed, where the operation changes employee-visible fields, by a
/// separate synchronization of the linked employee record.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use payroll_engine::config::PayrollConfig;
/// use payroll_engine::models::PayPerson;
/// use payroll_engine::service::PayrollCalculator;
/// use payroll_engine::store::InMemoryStore;
/// use rust_decimal::Decimal;
///
/// let store = Arc::new(InMemoryStore::new());
/// let calculator = PayrollCalculator::new(store, &PayrollConfig::builtin())?;
/// let person = PayPerson::new("Ann", "Smith", "Acme", Decimal::from(1_000_000));
/// let created = calculator.create(person)?;
/// assert_eq!(created.person.salary_after_tax_per_month, Decimal::from(57_540));
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PayrollCalculator<S> {
    store: S,
    engine: TaxEngine,
    uif_rate: Decimal,
}

impl<S> PayrollCalculator<S>
where
    S: PayPersonStore + EmployeeStore + RecordLocks,
{
    /// Creates a calculator using the configured tax year and UIF rate.
    pub fn new(store: S, config: &PayrollConfig) -> PayrollResult<Self> {
        Ok(Self {
            store,
            engine: TaxEngine::from_config(config)?,
            uif_rate: config.settings().uif_rate,
        })
    }

    /// Creates a calculator around an existing engine.
    pub fn with_engine(store: S, engine: TaxEngine, uif_rate: Decimal) -> Self {
        Self {
            store,
            engine,
            uif_rate,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the tax engine.
    pub fn engine(&self) -> &TaxEngine {
        &self.engine
    }

    /// Loads a pay person, failing with `NotFound` if it does not exist.
    pub fn get(&self, id: &PayPersonId) -> PayrollResult<PayPerson> {
        load(&self.store, id)
    }

    /// Loads every pay person.
    pub fn all(&self) -> PayrollResult<Vec<PayPerson>> {
        self.store.all()
    }

    /// Annual gross salary of a pay person.
    pub fn gross_salary(&self, id: &PayPersonId) -> PayrollResult<Decimal> {
        self.get(id).map(|p| p.salary)
    }

    /// Annual net salary of a pay person as last computed.
    pub fn net_salary(&self, id: &PayPersonId) -> PayrollResult<Decimal> {
        self.get(id).map(|p| p.salary_after_tax_per_year)
    }

    /// Unemployment insurance contribution on `salary` at the configured rate.
    pub fn uif_contribution(&self, salary: Decimal) -> PayrollResult<Decimal> {
        uif_contribution(salary, self.uif_rate)
    }

    /// Recomputes the derived pay fields of `person` in place without
    /// persisting. Idempotent for unchanged salary, deductions and rebate.
    pub fn recompute(&self, person: &mut PayPerson) -> PayrollResult<()> {
        person.validate()?;
        let figures = derive_pay_for(&self.engine, person)?;
        figures.apply_to(person);

        debug!(
            pay_person_id = %person.id,
            tax = %figures.tax,
            net_per_year = %figures.salary_after_tax_per_year,
            net_per_month = %figures.salary_after_tax_per_month,
            "Recomputed pay"
        );
        Ok(())
    }

    /// Recomputes and persists the pay figures of a stored pay person.
    pub fn recompute_pay(&self, id: &PayPersonId) -> PayrollResult<PayPerson> {
        self.store.with_record_lock(id, || {
            let mut person = load(&self.store, id)?;
            self.recompute(&mut person)?;
            self.store.save(person)
        })
    }

    /// Stores a new pay person with its inputs taken verbatim and its pay
    /// figures computed.
    ///
    /// Fails with `InvalidArgument` if an input is negative, the leave period
    /// is reversed, or the linked employee already has a pay person.
    ///
    /// A linked person is stored under the employee's derived lock, the same
    /// one [`Self::migrate_employees`] takes, so at most one pay person per
    /// employee is ever stored.
    pub fn create(&self, mut person: PayPerson) -> PayrollResult<UpsertOutcome> {
        self.recompute(&mut person)?;

        let id = person.id;
        let lock_id = person.employee_id.map_or(id, PayPersonId::for_employee);
        let person = self.store.with_record_lock(&lock_id, || {
            if let Some(employee_id) = person.employee_id {
                if let Some(existing) = self.store.find_by_employee_id(employee_id)? {
                    if existing.id != id {
                        return Err(PayrollError::invalid(
                            "employee_id",
                            format!(
                                "employee {} already has pay person {}",
                                employee_id, existing.id
                            ),
                        ));
                    }
                }
            }
            self.store.save(person)
        })?;

        info!(pay_person_id = %person.id, "Created pay person");
        let employee_sync = push_to_employee(&self.store, &person);
        Ok(UpsertOutcome {
            person,
            employee_sync,
        })
    }

    /// Applies an update to an existing pay person.
    ///
    /// Descriptive, salary and leave fields are replaced. Deductions and
    /// rebate are added onto the running totals. The incoming monthly leave
    /// days are rolled into the annual counter and the monthly counter is
    /// reset to zero. Pay is recomputed, the record persisted, and the linked
    /// employee synchronized afterwards.
    ///
    /// Fails with `NotFound` if `id` does not resolve.
    pub fn upsert(
        &self,
        id: &PayPersonId,
        update: &PayPersonUpdate,
    ) -> PayrollResult<UpsertOutcome> {
        update.validate()?;

        let person = self.store.with_record_lock(id, || {
            let mut person = load(&self.store, id)?;

            person.name = update.name.clone();
            person.surname = update.surname.clone();
            person.company = update.company.clone();
            person.salary = update.salary;
            person.leave_start_date = update.leave_start_date;
            person.leave_end_date = update.leave_end_date;
            person.leave_days_left_per_year = update.leave_days_left_per_year;
            person.is_leave_paid = update.is_leave_paid;

            person.deductions += update.deductions;
            person.rebate += update.rebate;

            person.leave_days_taken_per_year = person
                .leave_days_taken_per_year
                .checked_add(update.leave_days_taken_per_month)
                .ok_or_else(|| {
                    PayrollError::invalid(
                        "leave_days_taken_per_month",
                        "annual leave total overflows",
                    )
                })?;
            person.leave_days_taken_per_month = 0;

            self.recompute(&mut person)?;
            self.store.save(person)
        })?;

        info!(
            pay_person_id = %person.id,
            deductions = %person.deductions,
            rebate = %person.rebate,
            "Updated pay person"
        );
        let employee_sync = push_to_employee(&self.store, &person);
        Ok(UpsertOutcome {
            person,
            employee_sync,
        })
    }

    /// Subtracts a one-off amount directly from the annual salary.
    ///
    /// The new salary is rounded to whole units, persisted and pushed to the
    /// linked employee. Unlike [`Self::upsert`], this neither touches the
    /// cumulative deductions nor recomputes tax; call
    /// [`Self::recompute_pay`] to refresh the net figures.
    ///
    /// Fails with `InvalidArgument` if the amount is negative or exceeds the
    /// current salary.
    pub fn apply_deduction(
        &self,
        id: &PayPersonId,
        amount: Decimal,
    ) -> PayrollResult<DeductionOutcome> {
        ensure_non_negative("amount", amount)?;

        let person = self.store.with_record_lock(id, || {
            let mut person = load(&self.store, id)?;
            if amount > person.salary {
                return Err(PayrollError::invalid(
                    "amount",
                    format!("{} exceeds salary {}", amount, person.salary),
                ));
            }
            person.salary = round_whole(person.salary - amount);
            self.store.save(person)
        })?;

        info!(
            pay_person_id = %person.id,
            amount = %amount,
            salary = %person.salary,
            "Applied deduction"
        );
        let employee_sync = push_to_employee(&self.store, &person);
        Ok(DeductionOutcome {
            salary: person.salary,
            employee_sync,
        })
    }

    /// Removes a pay person and then its linked employee record.
    pub fn delete(&self, id: &PayPersonId) -> PayrollResult<EmployeeSync> {
        let person = self.store.with_record_lock(id, || {
            let person = load(&self.store, id)?;
            self.store.delete(id)?;
            Ok(person)
        })?;

        info!(pay_person_id = %id, "Deleted pay person");
        Ok(remove_employee(&self.store, &person))
    }

    /// Removes the pay person owned by an employee record that was removed.
    ///
    /// Returns whether a pay person existed.
    pub fn remove_for_employee(&self, employee_id: EmployeeId) -> PayrollResult<bool> {
        let Some(person) = self.store.find_by_employee_id(employee_id)? else {
            return Ok(false);
        };

        self.store
            .with_record_lock(&person.id, || self.store.delete(&person.id))?;
        info!(
            pay_person_id = %person.id,
            employee_id = %employee_id,
            "Removed pay person of deleted employee"
        );
        Ok(true)
    }

    /// Recomputes pay for every stored pay person.
    ///
    /// A failing record is reported and does not stop the others.
    pub fn recompute_all(&self) -> PayrollResult<BatchReport> {
        let mut report = BatchReport::new();
        for person in self.store.all()? {
            let result = self.recompute_pay(&person.id);
            if let Err(err) = &result {
                warn!(pay_person_id = %person.id, error = %err, "Recompute failed");
            }
            report.record(person.id, result);
        }

        info!(
            processed = report.processed,
            failed = report.failures.len(),
            "Recomputed pay for all pay people"
        );
        Ok(report)
    }

    /// Creates or refreshes the pay person of every employee record.
    ///
    /// Employees with a non-positive id are skipped. An employee that already
    /// has a pay person gets name, surname, salary and company refreshed on
    /// that record; otherwise one is created. Running this repeatedly never
    /// produces more than one pay person per employee.
    pub fn migrate_employees(&self) -> PayrollResult<BatchReport> {
        let mut report = BatchReport::new();
        for employee in self.store.all_employees()? {
            if !employee.id.is_valid() {
                report.skip();
                continue;
            }

            let result = self.sync_from_employee(&employee);
            if let Err(err) = &result {
                warn!(employee_id = %employee.id, error = %err, "Employee migration failed");
            }
            report.record(employee.id, result);
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failures.len(),
            "Migrated employees to pay people"
        );
        Ok(report)
    }

    fn sync_from_employee(&self, employee: &EmployeeRecord) -> PayrollResult<PayPerson> {
        let derived_id = PayPersonId::for_employee(employee.id);

        self.store.with_record_lock(&derived_id, || {
            match self.store.find_by_employee_id(employee.id)? {
                Some(existing) if existing.id != derived_id => {
                    self.store.with_record_lock(&existing.id, || {
                        self.refresh_from_employee(&existing.id, employee)
                    })
                }
                Some(existing) => self.refresh_from_employee(&existing.id, employee),
                None => {
                    let mut person = PayPerson::new(
                        employee.name.clone(),
                        employee.surname.clone(),
                        employee.company.clone(),
                        employee.salary,
                    )
                    .with_employee(employee.id);
                    person.id = derived_id;
                    self.recompute(&mut person)?;
                    debug!(
                        employee_id = %employee.id,
                        pay_person_id = %person.id,
                        "Derived pay person"
                    );
                    self.store.save(person)
                }
            }
        })
    }

    fn refresh_from_employee(
        &self,
        id: &PayPersonId,
        employee: &EmployeeRecord,
    ) -> PayrollResult<PayPerson> {
        let mut person = load(&self.store, id)?;
        person.name = employee.name.clone();
        person.surname = employee.surname.clone();
        person.company = employee.company.clone();
        person.salary = employee.salary;
        self.recompute(&mut person)?;
        self.store.save(person)
    }
}

pub(crate) fn load<S: PayPersonStore>(store: &S, id: &PayPersonId) -> PayrollResult<PayPerson> {
    store.get(id)?.ok_or_else(|| PayrollError::NotFound {
        entity: "pay person",
        id: id.to_string(),
    })
}
