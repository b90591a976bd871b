//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{PayrollError, PayrollResult};

use super::types::{PayrollConfig, PayrollSettings, TaxTable, TaxTables};

/// Loads payroll configuration from a directory.
///
/// # Directory Structure
///
/// ```text
/// config/za/
/// ├── payroll.yaml        # Active tax year, leave accrual, UIF rate
/// └── tax_tables/
///     └── 2024.yaml       # Brackets effective from tax year 2024
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load("./config/za")?;
/// println!("Active tax year: {}", config.settings().tax_year);
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns the [`PayrollConfig`] on success, or an error if:
    /// - `payroll.yaml` or the `tax_tables` directory is missing
    /// - Any file contains invalid YAML or an invalid tax table
    /// - No table is in force for the configured tax year
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<PayrollConfig> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<PayrollSettings>(&path.join("payroll.yaml"))?;
        let tables = Self::load_tax_tables(&path.join("tax_tables"))?;

        debug!(
            tax_year = settings.tax_year,
            tables = tables.years().count(),
            "Loaded payroll configuration"
        );

        PayrollConfig::new(settings, tables)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every `*.yaml` tax table from the directory.
    fn load_tax_tables(dir: &Path) -> PayrollResult<TaxTables> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| PayrollError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut tables = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| PayrollError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                tables.push(Self::load_yaml::<TaxTable>(&path)?);
            }
        }

        if tables.is_empty() {
            return Err(PayrollError::ConfigNotFound {
                path: format!("{} (no tax tables found)", dir_str),
            });
        }

        TaxTables::new(tables)
    }
}
