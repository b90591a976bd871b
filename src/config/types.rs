//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, together with the
//! built-in defaults.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{PayrollError, PayrollResult};

/// A single income tax bracket.
///
/// Income strictly above `threshold` falls into this bracket (unless a higher
/// bracket also matches) and is taxed at `base + rate * (income - threshold)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TaxBracket {
    /// Exclusive lower bound of the bracket.
    pub threshold: Decimal,
    /// Tax owed on income up to the threshold.
    pub base: Decimal,
    /// Marginal rate applied to the excess over the threshold.
    pub rate: Decimal,
}

impl TaxBracket {
    /// Creates a bracket from whole-unit threshold and base and a rate.
    pub fn new(threshold: Decimal, base: Decimal, rate: Decimal) -> Self {
        Self {
            threshold,
            base,
            rate,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaxTableDef {
    tax_year: i32,
    #[serde(default)]
    description: String,
    brackets: Vec<TaxBracket>,
}

/// The bracket table for one tax year.
///
/// Brackets are kept in ascending threshold order. The lowest bracket always
/// has a threshold of zero and is the fallback for any income that exceeds
/// no threshold, including zero and negative taxable income.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TaxTableDef")]
pub struct TaxTable {
    tax_year: i32,
    description: String,
    lowest: TaxBracket,
    upper: Vec<TaxBracket>,
}

impl TryFrom<TaxTableDef> for TaxTable {
    type Error = PayrollError;

    fn try_from(def: TaxTableDef) -> PayrollResult<Self> {
        Self::new(def.tax_year, def.description, def.brackets)
    }
}

impl TaxTable {
    /// Creates a tax table, validating the bracket layout.
    ///
    /// Fails with `InvalidConfig` when the table is empty, the first bracket
    /// does not start at zero, thresholds are not strictly ascending, or any
    /// base or rate is negative.
    pub fn new(
        tax_year: i32,
        description: impl Into<String>,
        brackets: Vec<TaxBracket>,
    ) -> PayrollResult<Self> {
        let mut iter = brackets.into_iter();
        let lowest = iter.next().ok_or_else(|| PayrollError::InvalidConfig {
            message: format!("tax table {} has no brackets", tax_year),
        })?;
        if !lowest.threshold.is_zero() {
            return Err(PayrollError::InvalidConfig {
                message: format!(
                    "tax table {} must start at threshold 0, found {}",
                    tax_year, lowest.threshold
                ),
            });
        }

        let upper: Vec<TaxBracket> = iter.collect();
        let mut previous = lowest.threshold;
        for bracket in std::iter::once(&lowest).chain(upper.iter()) {
            if bracket.base < Decimal::ZERO || bracket.rate < Decimal::ZERO {
                return Err(PayrollError::InvalidConfig {
                    message: format!(
                        "tax table {} bracket {} has a negative base or rate",
                        tax_year, bracket.threshold
                    ),
                });
            }
        }
        for bracket in &upper {
            if bracket.threshold <= previous {
                return Err(PayrollError::InvalidConfig {
                    message: format!(
                        "tax table {} thresholds must be strictly ascending ({} after {})",
                        tax_year, bracket.threshold, previous
                    ),
                });
            }
            previous = bracket.threshold;
        }

        Ok(Self {
            tax_year,
            description: description.into(),
            lowest,
            upper,
        })
    }

    /// The 2023/2024 individual income tax table (tax year 2024).
    pub fn builtin_2024() -> Self {
        let bracket = |threshold: i64, base: i64, rate_pct: i64| {
            TaxBracket::new(
                Decimal::from(threshold),
                Decimal::from(base),
                Decimal::new(rate_pct, 2),
            )
        };

        Self {
            tax_year: 2024,
            description: "Individual income tax, 1 March 2023 - 29 February 2024".to_string(),
            lowest: bracket(0, 0, 18),
            upper: vec![
                bracket(237_100, 42_678, 26),
                bracket(370_500, 77_362, 31),
                bracket(512_800, 121_475, 36),
                bracket(673_000, 179_147, 39),
                bracket(857_900, 251_258, 41),
                bracket(1_817_000, 644_489, 45),
            ],
        }
    }

    /// The tax year this table takes effect.
    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    /// Free-form description of the table.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All brackets in ascending threshold order.
    pub fn brackets(&self) -> impl Iterator<Item = &TaxBracket> {
        std::iter::once(&self.lowest).chain(self.upper.iter())
    }

    /// Selects the bracket for a taxable income.
    ///
    /// Thresholds are checked from highest to lowest and the first one the
    /// income strictly exceeds wins, so an income exactly on a threshold
    /// belongs to the bracket below it.
    pub fn bracket_for(&self, taxable_income: Decimal) -> &TaxBracket {
        self.upper
            .iter()
            .rev()
            .find(|b| taxable_income > b.threshold)
            .unwrap_or(&self.lowest)
    }
}

/// Tax tables keyed by the tax year in which they take effect.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxTables {
    tables: BTreeMap<i32, TaxTable>,
}

impl TaxTables {
    /// Builds the collection, rejecting two tables for the same year.
    pub fn new(tables: Vec<TaxTable>) -> PayrollResult<Self> {
        let mut map = BTreeMap::new();
        for table in tables {
            let year = table.tax_year();
            if map.insert(year, table).is_some() {
                return Err(PayrollError::InvalidConfig {
                    message: format!("duplicate tax table for year {}", year),
                });
            }
        }
        Ok(Self { tables: map })
    }

    /// The built-in tables.
    pub fn builtin() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(2024, TaxTable::builtin_2024());
        Self { tables }
    }

    /// Returns the table in force for `tax_year`: the most recent table whose
    /// effective year is not after it.
    pub fn effective_for(&self, tax_year: i32) -> PayrollResult<&TaxTable> {
        self.tables
            .range(..=tax_year)
            .next_back()
            .map(|(_, table)| table)
            .ok_or(PayrollError::TaxTableNotFound { year: tax_year })
    }

    /// Effective years of all loaded tables, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.tables.keys().copied()
    }
}

fn default_leave_accrual_per_month() -> Decimal {
    Decimal::new(15, 1)
}

fn default_uif_rate() -> Decimal {
    Decimal::new(1, 2)
}

/// Process-wide payroll settings from `payroll.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayrollSettings {
    /// Tax year whose table is used for pay calculations.
    pub tax_year: i32,
    /// Leave days accrued per month, independent of salary and tenure.
    #[serde(default = "default_leave_accrual_per_month")]
    pub leave_accrual_per_month: Decimal,
    /// Unemployment insurance contribution rate applied to salary.
    #[serde(default = "default_uif_rate")]
    pub uif_rate: Decimal,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            tax_year: 2024,
            leave_accrual_per_month: default_leave_accrual_per_month(),
            uif_rate: default_uif_rate(),
        }
    }
}

impl PayrollSettings {
    /// Rejects negative rates.
    pub fn validate(&self) -> PayrollResult<()> {
        if self.leave_accrual_per_month < Decimal::ZERO {
            return Err(PayrollError::InvalidConfig {
                message: format!(
                    "leave_accrual_per_month must not be negative, got {}",
                    self.leave_accrual_per_month
                ),
            });
        }
        if self.uif_rate < Decimal::ZERO {
            return Err(PayrollError::InvalidConfig {
                message: format!("uif_rate must not be negative, got {}", self.uif_rate),
            });
        }
        Ok(())
    }
}

/// The complete payroll configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollConfig {
    settings: PayrollSettings,
    tax_tables: TaxTables,
}

impl PayrollConfig {
    /// Creates a configuration, checking that a table is in force for the
    /// configured tax year.
    pub fn new(settings: PayrollSettings, tax_tables: TaxTables) -> PayrollResult<Self> {
        settings.validate()?;
        tax_tables.effective_for(settings.tax_year)?;
        Ok(Self {
            settings,
            tax_tables,
        })
    }

    /// The built-in configuration: 2024 tables, 1.5 leave days per month, 1% UIF.
    pub fn builtin() -> Self {
        Self {
            settings: PayrollSettings::default(),
            tax_tables: TaxTables::builtin(),
        }
    }

    /// Returns the payroll settings.
    pub fn settings(&self) -> &PayrollSettings {
        &self.settings
    }

    /// Returns the tax tables.
    pub fn tax_tables(&self) -> &TaxTables {
        &self.tax_tables
    }
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_builtin_table_has_seven_ascending_brackets() {
        let table = TaxTable::builtin_2024();
        let thresholds: Vec<Decimal> = table.brackets().map(|b| b.threshold).collect();
        assert_eq!(thresholds.len(), 7);
        assert!(thresholds.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(thresholds[0], Decimal::ZERO);
    }

    #[test]
    fn test_builtin_table_passes_validation() {
        let table = TaxTable::builtin_2024();
        let rebuilt = TaxTable::new(
            table.tax_year(),
            table.description(),
            table.brackets().copied().collect(),
        )
        .unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_bracket_for_boundary_belongs_below() {
        let table = TaxTable::builtin_2024();
        assert_eq!(table.bracket_for(dec("237100")).threshold, Decimal::ZERO);
        assert_eq!(
            table.bracket_for(dec("237100.01")).threshold,
            dec("237100")
        );
        assert_eq!(table.bracket_for(dec("1817000")).threshold, dec("857900"));
        assert_eq!(table.bracket_for(dec("5000000")).threshold, dec("1817000"));
    }

    #[test]
    fn test_bracket_for_negative_income_uses_lowest() {
        let table = TaxTable::builtin_2024();
        assert_eq!(table.bracket_for(dec("-500")).threshold, Decimal::ZERO);
        assert_eq!(table.bracket_for(Decimal::ZERO).threshold, Decimal::ZERO);
    }

    #[test]
    fn test_table_without_brackets_is_rejected() {
        let result = TaxTable::new(2025, "", vec![]);
        assert!(matches!(result, Err(PayrollError::InvalidConfig { .. })));
    }

    #[test]
    fn test_table_must_start_at_zero() {
        let result = TaxTable::new(
            2025,
            "",
            vec![TaxBracket::new(dec("100"), Decimal::ZERO, dec("0.1"))],
        );
        assert!(matches!(result, Err(PayrollError::InvalidConfig { .. })));
    }

    #[test]
    fn test_table_rejects_unordered_thresholds() {
        let result = TaxTable::new(
            2025,
            "",
            vec![
                TaxBracket::new(Decimal::ZERO, Decimal::ZERO, dec("0.1")),
                TaxBracket::new(dec("500"), dec("50"), dec("0.2")),
                TaxBracket::new(dec("500"), dec("50"), dec("0.3")),
            ],
        );
        assert!(matches!(result, Err(PayrollError::InvalidConfig { .. })));
    }

    #[test]
    fn test_table_rejects_negative_rate() {
        let result = TaxTable::new(
            2025,
            "",
            vec![TaxBracket::new(Decimal::ZERO, Decimal::ZERO, dec("-0.1"))],
        );
        assert!(matches!(result, Err(PayrollError::InvalidConfig { .. })));
    }

    #[test]
    fn test_effective_for_picks_most_recent_not_after_year() {
        let later = TaxTable::new(
            2026,
            "later",
            vec![TaxBracket::new(Decimal::ZERO, Decimal::ZERO, dec("0.2"))],
        )
        .unwrap();
        let tables = TaxTables::new(vec![TaxTable::builtin_2024(), later]).unwrap();

        assert_eq!(tables.effective_for(2024).unwrap().tax_year(), 2024);
        assert_eq!(tables.effective_for(2025).unwrap().tax_year(), 2024);
        assert_eq!(tables.effective_for(2030).unwrap().tax_year(), 2026);
        assert!(matches!(
            tables.effective_for(2023),
            Err(PayrollError::TaxTableNotFound { year: 2023 })
        ));
    }

    #[test]
    fn test_duplicate_years_rejected() {
        let result = TaxTables::new(vec![TaxTable::builtin_2024(), TaxTable::builtin_2024()]);
        assert!(matches!(result, Err(PayrollError::InvalidConfig { .. })));
    }

    #[test]
    fn test_default_settings() {
        let settings = PayrollSettings::default();
        assert_eq!(settings.tax_year, 2024);
        assert_eq!(settings.leave_accrual_per_month, dec("1.5"));
        assert_eq!(settings.uif_rate, dec("0.01"));
    }

    #[test]
    fn test_config_requires_table_for_tax_year() {
        let settings = PayrollSettings {
            tax_year: 2020,
            ..PayrollSettings::default()
        };
        let result = PayrollConfig::new(settings, TaxTables::builtin());
        assert!(matches!(
            result,
            Err(PayrollError::TaxTableNotFound { year: 2020 })
        ));
    }

    #[test]
    fn test_config_rejects_negative_accrual() {
        let settings = PayrollSettings {
            leave_accrual_per_month: dec("-1"),
            ..PayrollSettings::default()
        };
        let result = PayrollConfig::new(settings, TaxTables::builtin());
        assert!(matches!(result, Err(PayrollError::InvalidConfig { .. })));
    }

    #[test]
    fn test_deserialize_tax_table_from_yaml() {
        let yaml = r#"
tax_year: 2025
description: test table
brackets:
  - { threshold: "0", base: "0", rate: "0.1" }
  - { threshold: "1000", base: "100", rate: "0.2" }
"#;
        let table: TaxTable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(table.tax_year(), 2025);
        assert_eq!(table.bracket_for(dec("1500")).rate, dec("0.2"));
    }

    #[test]
    fn test_deserialize_invalid_tax_table_fails() {
        let yaml = r#"
tax_year: 2025
brackets:
  - { threshold: "10", base: "0", rate: "0.1" }
"#;
        let result: Result<TaxTable, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
