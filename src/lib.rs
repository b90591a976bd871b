//! Payroll engine
//!
//! This crate computes progressive income tax with rebates, derives annual
//! and monthly gross and net pay, and tracks leave-day accrual, consumption
//! and unpaid leave for pay records kept in a caller-supplied store.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
