//! Configuration loading and management for the payroll engine.
//!
//! Tax brackets are versioned by the tax year in which they take effect, so a
//! new year is added as another table rather than by changing calculation
//! code. Configuration is either built in ([`PayrollConfig::builtin`]) or
//! loaded from YAML files with [`ConfigLoader`].
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/za").unwrap();
//! println!("Active tax year: {}", config.settings().tax_year);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{PayrollConfig, PayrollSettings, TaxBracket, TaxTable, TaxTables};
