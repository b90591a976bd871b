//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing pay and leave.

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
///
/// let error = PayrollError::NotFound {
///     entity: "pay person",
///     id: "42".to_string(),
/// };
/// assert_eq!(error.to_string(), "pay person not found: 42");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// The operation addressed a record that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: &'static str,
        /// The identifier that did not resolve.
        id: String,
    },

    /// An input value failed validation.
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument {
        /// The offending field or parameter.
        field: &'static str,
        /// A description of what made the value invalid.
        message: String,
    },

    /// No tax table is effective for the requested year.
    #[error("No tax table effective for tax year {year}")]
    TaxTableNotFound {
        /// The requested tax year.
        year: i32,
    },

    /// Configuration values were structurally invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the problem.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The backing store failed.
    #[error("Store error: {message}")]
    Store {
        /// A description of the infrastructure failure.
        message: String,
    },
}

impl PayrollError {
    /// Shorthand for an [`PayrollError::InvalidArgument`] error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    /// Returns true if this is a [`PayrollError::NotFound`] error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
