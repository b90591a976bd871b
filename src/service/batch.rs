//! Per-item outcome reporting for batch operations.

use crate::error::{PayrollError, PayrollResult};

/// A single failed item of a batch.
#[derive(Debug)]
pub struct BatchFailure {
    /// Identifier of the item that failed.
    pub key: String,
    /// Why it failed.
    pub error: PayrollError,
}

/// Summary of a batch run. A failed item never stops the remaining items.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Items processed successfully.
    pub processed: usize,
    /// Items deliberately left untouched.
    pub skipped: usize,
    /// Items that failed.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result of one item.
    pub fn record<T>(&mut self, key: impl ToString, result: PayrollResult<T>) {
        match result {
            Ok(_) => self.processed += 1,
            Err(error) => self.failures.push(BatchFailure {
                key: key.to_string(),
                error,
            }),
        }
    }

    /// Records an item that was skipped.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// True when no item failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
