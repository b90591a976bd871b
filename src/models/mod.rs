//! Core data models for the payroll engine.
//!
//! This module contains the domain models shared by the calculators and the
//! store interfaces.

mod employee;
mod pay_person;

pub use employee::{EmployeeId, EmployeeRecord};
pub use pay_person::{PayPerson, PayPersonId, PayPersonUpdate};
pub(crate) use pay_person::{ensure_leave_period, ensure_non_negative};
