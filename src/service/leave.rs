//! Leave-day tracking over stored pay people.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::payroll::load;
use crate::calculation::{
    annual_entitlement, leave_days_in_start_month, leave_days_left, payout_value,
    unpaid_leave_days,
};
use crate::config::PayrollSettings;
use crate::error::PayrollResult;
use crate::models::{PayPerson, PayPersonId, ensure_leave_period};
use crate::store::{PayPersonStore, RecordLocks};

/// Tracks leave entitlement, consumption and payouts.
///
/// Leave accrues at a fixed rate per month taken from [`PayrollSettings`].
#[derive(Debug, Clone)]
pub struct LeaveLedger<S> {
    store: S,
    accrual_per_month: Decimal,
}

impl<S> LeaveLedger<S>
where
    S: PayPersonStore + RecordLocks,
{
    /// Creates a ledger using the configured accrual rate.
    pub fn new(store: S, settings: &PayrollSettings) -> Self {
        Self {
            store,
            accrual_per_month: settings.leave_accrual_per_month,
        }
    }

    /// Leave days accrued per month.
    pub fn accrual_rate(&self) -> Decimal {
        self.accrual_per_month
    }

    /// Leave days accrued per year.
    pub fn annual_entitlement(&self) -> Decimal {
        annual_entitlement(self.accrual_per_month)
    }

    /// Leave days taken this period beyond the remaining entitlement plus
    /// this period's accrual.
    pub fn unpaid_leave_days(&self, id: &PayPersonId) -> PayrollResult<Decimal> {
        let person = load(&self.store, id)?;
        Ok(unpaid_leave_days(
            person.leave_days_taken_per_month,
            person.leave_days_left_per_year,
            self.accrual_per_month,
        ))
    }

    /// Value of paying out leave days at a daily rate.
    pub fn payout_value(&self, daily_salary: Decimal, leave_days: u32) -> PayrollResult<Decimal> {
        payout_value(daily_salary, leave_days)
    }

    /// Sets the leave period and paid flag, then recomputes the monthly and
    /// annual leave counters and persists.
    ///
    /// Fails with `InvalidArgument` if `end` is before `start`.
    pub fn set_leave_period(
        &self,
        id: &PayPersonId,
        start: NaiveDate,
        end: NaiveDate,
        is_paid: bool,
    ) -> PayrollResult<PayPerson> {
        ensure_leave_period(Some(start), Some(end))?;

        let person = self.store.with_record_lock(id, || {
            let mut person = load(&self.store, id)?;
            person.leave_start_date = Some(start);
            person.leave_end_date = Some(end);
            person.is_leave_paid = is_paid;
            self.derive_leave(&mut person)?;
            self.store.save(person)
        })?;

        info!(
            pay_person_id = %id,
            start = %start,
            end = %end,
            is_paid,
            days_this_month = person.leave_days_taken_per_month,
            "Set leave period"
        );
        Ok(person)
    }

    /// Marks the current leave as paid or unpaid.
    pub fn update_leave_payment_status(
        &self,
        id: &PayPersonId,
        is_paid: bool,
    ) -> PayrollResult<PayPerson> {
        self.store.with_record_lock(id, || {
            let mut person = load(&self.store, id)?;
            person.is_leave_paid = is_paid;
            self.store.save(person)
        })
    }

    /// Recomputes the leave days taken this month from the leave period and
    /// persists. A person without a complete leave period keeps its counter.
    pub fn leave_days_for_month(&self, id: &PayPersonId) -> PayrollResult<u32> {
        self.store.with_record_lock(id, || {
            let mut person = load(&self.store, id)?;
            self.derive_month(&mut person)?;
            let days = person.leave_days_taken_per_month;
            self.store.save(person)?;
            Ok(days)
        })
    }

    /// Recomputes the remaining annual entitlement and persists.
    pub fn leave_days_for_year(&self, id: &PayPersonId) -> PayrollResult<Decimal> {
        self.store.with_record_lock(id, || {
            let mut person = load(&self.store, id)?;
            self.derive_year(&mut person);
            let days = person.leave_days_left_per_year;
            self.store.save(person)?;
            Ok(days)
        })
    }

    /// Recomputes both leave counters in place without persisting.
    pub fn derive_leave(&self, person: &mut PayPerson) -> PayrollResult<()> {
        self.derive_month(person)?;
        self.derive_year(person);
        Ok(())
    }

    fn derive_month(&self, person: &mut PayPerson) -> PayrollResult<()> {
        if let Some((start, end)) = person.leave_period() {
            person.leave_days_taken_per_month = leave_days_in_start_month(start, end)?;
        }
        Ok(())
    }

    fn derive_year(&self, person: &mut PayPerson) {
        person.leave_days_left_per_year =
            leave_days_left(self.accrual_per_month, person.leave_days_taken_per_year);
        debug!(
            pay_person_id = %person.id,
            left = %person.leave_days_left_per_year,
            taken = person.leave_days_taken_per_year,
            "Derived annual leave"
        );
    }
}
