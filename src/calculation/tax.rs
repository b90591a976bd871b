//! Progressive income tax calculation.
//!
//! Taxable income is gross salary minus deductions. Exactly one bracket is
//! selected by strict comparison against its threshold, and the rebate is
//! credited against the bracket tax before clamping at zero.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{PayrollConfig, TaxBracket, TaxTable, TaxTables};
use crate::error::PayrollResult;
use crate::models::ensure_non_negative;

/// The breakdown of a tax calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxCalculation {
    /// Gross salary minus deductions. May be negative.
    pub taxable_income: Decimal,
    /// The bracket the taxable income fell into.
    pub bracket: TaxBracket,
    /// Tax before the rebate is applied. Negative when taxable income is.
    pub gross_tax: Decimal,
    /// Tax owed after the rebate, never negative.
    pub tax_owed: Decimal,
}

/// Calculates the tax owed against a specific table.
///
/// # Arguments
///
/// * `table` - The bracket table to use
/// * `gross_salary` - Annual gross salary
/// * `deductions` - Deductions subtracted from gross salary
/// * `rebate` - Credit subtracted from the bracket tax
///
/// # Returns
///
/// Returns the [`TaxCalculation`] breakdown, or `InvalidArgument` if any input
/// is negative.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_tax;
/// use payroll_engine::config::TaxTable;
/// use rust_decimal::Decimal;
///
/// let table = TaxTable::builtin_2024();
/// let result =
///     calculate_tax(&table, Decimal::from(237_100), Decimal::ZERO, Decimal::ZERO).unwrap();
/// assert_eq!(result.tax_owed, Decimal::from(42_678));
/// ```
pub fn calculate_tax(
    table: &TaxTable,
    gross_salary: Decimal,
    deductions: Decimal,
    rebate: Decimal,
) -> PayrollResult<TaxCalculation> {
    ensure_non_negative("gross_salary", gross_salary)?;
    ensure_non_negative("deductions", deductions)?;
    ensure_non_negative("rebate", rebate)?;

    // Not clamped: negative taxable income still lands in the lowest bracket.
    let taxable_income = gross_salary - deductions;
    let bracket = *table.bracket_for(taxable_income);
    let gross_tax = bracket.base + (taxable_income - bracket.threshold) * bracket.rate;
    let tax_owed = (gross_tax - rebate).max(Decimal::ZERO);

    debug!(
        tax_year = table.tax_year(),
        taxable_income = %taxable_income,
        threshold = %bracket.threshold,
        gross_tax = %gross_tax,
        tax_owed = %tax_owed,
        "Calculated income tax"
    );

    Ok(TaxCalculation {
        taxable_income,
        bracket,
        gross_tax,
        tax_owed,
    })
}

/// Stateless tax calculator bound to an active tax year.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::TaxEngine;
/// use rust_decimal::Decimal;
///
/// let engine = TaxEngine::builtin();
/// let tax = engine
///     .compute_tax(Decimal::from(1_000_000), Decimal::ZERO, Decimal::ZERO)
///     .unwrap();
/// assert_eq!(tax, Decimal::from(309_519));
/// ```
#[derive(Debug, Clone)]
pub struct TaxEngine {
    tables: TaxTables,
    tax_year: i32,
}

impl TaxEngine {
    /// Creates an engine computing with the table in force for `tax_year`.
    ///
    /// Fails with `TaxTableNotFound` when no table applies to that year.
    pub fn new(tables: TaxTables, tax_year: i32) -> PayrollResult<Self> {
        tables.effective_for(tax_year)?;
        Ok(Self { tables, tax_year })
    }

    /// Creates an engine from a loaded configuration.
    pub fn from_config(config: &PayrollConfig) -> PayrollResult<Self> {
        Self::new(config.tax_tables().clone(), config.settings().tax_year)
    }

    /// An engine over the built-in tables for tax year 2024.
    pub fn builtin() -> Self {
        Self {
            tables: TaxTables::builtin(),
            tax_year: 2024,
        }
    }

    /// The active tax year.
    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    /// All tables known to the engine.
    pub fn tables(&self) -> &TaxTables {
        &self.tables
    }

    /// Computes the tax owed for the active tax year.
    pub fn compute_tax(
        &self,
        gross_salary: Decimal,
        deductions: Decimal,
        rebate: Decimal,
    ) -> PayrollResult<Decimal> {
        self.compute_tax_for_year(self.tax_year, gross_salary, deductions, rebate)
    }

    /// Computes the tax owed using the table in force for `tax_year`.
    pub fn compute_tax_for_year(
        &self,
        tax_year: i32,
        gross_salary: Decimal,
        deductions: Decimal,
        rebate: Decimal,
    ) -> PayrollResult<Decimal> {
        let table = self.tables.effective_for(tax_year)?;
        calculate_tax(table, gross_salary, deductions, rebate).map(|c| c.tax_owed)
    }

    /// Full breakdown for the active tax year.
    pub fn calculate(
        &self,
        gross_salary: Decimal,
        deductions: Decimal,
        rebate: Decimal,
    ) -> PayrollResult<TaxCalculation> {
        let table = self.tables.effective_for(self.tax_year)?;
        calculate_tax(table, gross_salary, deductions, rebate)
    }
}

impl Default for TaxEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayrollError;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn tax(gross: &str, deductions: &str, rebate: &str) -> Decimal {
        TaxEngine::builtin()
            .compute_tax(dec(gross), dec(deductions), dec(rebate))
            .unwrap()
    }

    #[test]
    fn test_lowest_bracket_applies_flat_rate() {
        assert_eq!(tax("100000", "0", "0"), dec("18000"));
    }

    #[test]
    fn test_threshold_belongs_to_bracket_below() {
        assert_eq!(tax("237100", "0", "0"), dec("42678"));
        assert_eq!(tax("370500", "0", "0"), dec("77362"));
        assert_eq!(tax("857900", "0", "0"), dec("251258"));
    }

    #[test]
    fn test_just_above_threshold_uses_upper_bracket() {
        // 42678 + 1 * 0.26
        assert_eq!(tax("237101", "0", "0"), dec("42678.26"));
    }

    #[test]
    fn test_brackets_are_continuous_at_thresholds() {
        let table = TaxTable::builtin_2024();
        for bracket in table.brackets() {
            let at = calculate_tax(&table, bracket.threshold, Decimal::ZERO, Decimal::ZERO)
                .unwrap()
                .tax_owed;
            assert_eq!(at, bracket.base, "threshold {}", bracket.threshold);
        }
    }

    #[test]
    fn test_one_million_salary() {
        // 251258 + (1000000 - 857900) * 0.41
        assert_eq!(tax("1000000", "0", "0"), dec("309519"));
    }

    #[test]
    fn test_top_bracket() {
        // 644489 + (2000000 - 1817000) * 0.45
        assert_eq!(tax("2000000", "0", "0"), dec("726839"));
    }

    #[test]
    fn test_deductions_reduce_taxable_income() {
        let result = TaxEngine::builtin()
            .calculate(dec("400000"), dec("50000"), Decimal::ZERO)
            .unwrap();
        assert_eq!(result.taxable_income, dec("350000"));
        assert_eq!(result.bracket.threshold, dec("237100"));
        // 42678 + 112900 * 0.26
        assert_eq!(result.tax_owed, dec("72032"));
    }

    #[test]
    fn test_deductions_above_salary_use_lowest_bracket_and_clamp() {
        let result = TaxEngine::builtin()
            .calculate(dec("1000"), dec("5000"), Decimal::ZERO)
            .unwrap();
        assert_eq!(result.taxable_income, dec("-4000"));
        assert_eq!(result.bracket.threshold, Decimal::ZERO);
        assert_eq!(result.gross_tax, dec("-720"));
        assert_eq!(result.tax_owed, Decimal::ZERO);
    }

    #[test]
    fn test_rebate_reduces_tax() {
        assert_eq!(tax("100000", "0", "17235"), dec("765"));
    }

    #[test]
    fn test_rebate_larger_than_tax_clamps_to_zero() {
        assert_eq!(tax("50000", "0", "17235"), Decimal::ZERO);
    }

    #[test]
    fn test_negative_input_is_rejected() {
        let result = TaxEngine::builtin().compute_tax(dec("-1"), Decimal::ZERO, Decimal::ZERO);
        match result {
            Err(PayrollError::InvalidArgument { field, .. }) => assert_eq!(field, "gross_salary"),
            other => panic!("Expected InvalidArgument, got {:?}", other),
        }
        assert!(
            TaxEngine::builtin()
                .compute_tax(Decimal::ZERO, Decimal::ZERO, dec("-5"))
                .is_err()
        );
    }

    #[test]
    fn test_unknown_year_returns_error() {
        let result = TaxEngine::builtin().compute_tax_for_year(
            2010,
            dec("1000"),
            Decimal::ZERO,
            Decimal::ZERO,
        );
        assert!(matches!(
            result,
            Err(PayrollError::TaxTableNotFound { year: 2010 })
        ));
    }

    #[test]
    fn test_new_engine_requires_table_for_year() {
        assert!(TaxEngine::new(TaxTables::builtin(), 2023).is_err());
        assert_eq!(
            TaxEngine::new(TaxTables::builtin(), 2025).unwrap().tax_year(),
            2025
        );
    }

    proptest! {
        #[test]
        fn prop_tax_is_never_negative(
            gross in 0i64..5_000_000,
            deductions in 0i64..5_000_000,
            rebate in 0i64..1_000_000,
        ) {
            let owed = TaxEngine::builtin()
                .compute_tax(Decimal::from(gross), Decimal::from(deductions), Decimal::from(rebate))
                .unwrap();
            prop_assert!(owed >= Decimal::ZERO);
        }

        #[test]
        fn prop_tax_never_exceeds_gross(gross in 0i64..5_000_000) {
            let owed = TaxEngine::builtin()
                .compute_tax(Decimal::from(gross), Decimal::ZERO, Decimal::ZERO)
                .unwrap();
            prop_assert!(owed <= Decimal::from(gross));
        }

        #[test]
        fn prop_tax_is_monotonic_in_salary(gross in 0i64..5_000_000, raise in 0i64..100_000) {
            let engine = TaxEngine::builtin();
            let lower = engine
                .compute_tax(Decimal::from(gross), Decimal::ZERO, Decimal::ZERO)
                .unwrap();
            let higher = engine
                .compute_tax(Decimal::from(gross + raise), Decimal::ZERO, Decimal::ZERO)
                .unwrap();
            prop_assert!(higher >= lower);
        }
    }
}
