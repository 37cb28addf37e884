//! Progressive (marginal bracket) income tax.
//!
//! Income is split into slices by the bracket bounds and each slice is taxed
//! only at its own bracket's rate. Intermediate per-bracket charges keep full
//! precision; only the final tax is rounded to the cent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round_money;
use crate::config::{BracketTable, TaxBracket};
use crate::models::AuditStep;

/// The tax charged within one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCharge {
    /// The bracket's inclusive lower bound.
    pub lower_bound: Decimal,
    /// The bracket's exclusive upper bound, `None` if unbounded.
    pub upper_bound: Option<Decimal>,
    /// The bracket's rate as a percentage.
    pub rate_percent: Decimal,
    /// The part of taxable income falling within the bracket.
    pub taxed_amount: Decimal,
    /// Unrounded tax on `taxed_amount`.
    pub tax: Decimal,
}

/// The result of a progressive tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveTaxResult {
    /// The final tax, rounded to the cent.
    pub tax: Decimal,
    /// Charges for each bracket that received income.
    pub bands: Vec<BandCharge>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

fn band_charges(taxable_income: Decimal, brackets: &[TaxBracket]) -> Vec<BandCharge> {
    let mut bands = Vec::new();
    let mut remaining = taxable_income;

    for bracket in brackets {
        if remaining <= Decimal::ZERO {
            break;
        }

        let span = match bracket.width() {
            Some(width) => remaining.min(width),
            None => remaining,
        };
        let tax = span * bracket.rate();

        bands.push(BandCharge {
            lower_bound: bracket.lower_bound,
            upper_bound: bracket.upper_bound,
            rate_percent: bracket.rate_percent,
            taxed_amount: span,
            tax,
        });
        remaining -= span;
    }

    bands
}

/// Computes progressive tax on a taxable amount.
///
/// Zero or negative taxable income yields zero tax.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_tax;
/// use payroll_engine::config::TaxBracket;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let brackets = vec![
///     TaxBracket {
///         lower_bound: Decimal::ZERO,
///         upper_bound: Some(Decimal::from(2000)),
///         rate_percent: Decimal::from(10),
///     },
///     TaxBracket {
///         lower_bound: Decimal::from(2000),
///         upper_bound: None,
///         rate_percent: Decimal::from(20),
///     },
/// ];
///
/// let tax = compute_tax(Decimal::from_str("5340.00").unwrap(), &brackets);
/// assert_eq!(tax, Decimal::from_str("868.00").unwrap());
/// ```
pub fn compute_tax(taxable_income: Decimal, brackets: &[TaxBracket]) -> Decimal {
    let total: Decimal = band_charges(taxable_income, brackets)
        .iter()
        .map(|band| band.tax)
        .sum();
    round_money(total)
}

/// Computes progressive tax against a validated table, with per-band detail
/// and an audit step.
pub fn calculate_progressive_tax(
    taxable_income: Decimal,
    table: &BracketTable,
    step_number: u32,
) -> ProgressiveTaxResult {
    let bands = band_charges(taxable_income, table.brackets());
    let unrounded: Decimal = bands.iter().map(|band| band.tax).sum();
    let tax = round_money(unrounded);

    let reasoning = if bands.is_empty() {
        format!(
            "Taxable income {} is not positive; no tax under the {} table",
            taxable_income,
            table.year()
        )
    } else {
        let slices: Vec<String> = bands
            .iter()
            .map(|band| format!("{} @ {}%", band.taxed_amount, band.rate_percent))
            .collect();
        format!(
            "Taxable income {} split across {} bracket(s) of the {} table: {} = {}",
            taxable_income,
            bands.len(),
            table.year(),
            slices.join(" + "),
            tax
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "progressive_tax".to_string(),
        rule_name: "Progressive Tax".to_string(),
        input: serde_json::json!({
            "taxable_income": taxable_income.to_string(),
            "tax_year": table.year()
        }),
        output: serde_json::json!({
            "bands": bands,
            "unrounded_tax": unrounded.to_string(),
            "tax": tax.to_string()
        }),
        reasoning,
    };

    ProgressiveTaxResult {
        tax,
        bands,
        audit_step,
    }
}
