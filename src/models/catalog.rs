//! Salary scale and allowance/deduction catalog types.
//!
//! Catalog entries carry the rule used to compute each item as an explicit
//! enum rather than as loose boolean flags.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A salary scale entry: grade and step map to a basic salary.
///
/// # Example
///
/// ```
/// use payroll_engine::models::GradeStep;
/// use rust_decimal::Decimal;
///
/// let grade = GradeStep {
///     title: "Senior Lecturer".to_string(),
///     grade_code: "SL".to_string(),
///     step: 3,
///     basic_salary: Decimal::new(650000, 2),
/// };
/// assert_eq!(grade.basic_salary.to_string(), "6500.00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeStep {
    /// Human-readable title (e.g. "Senior Lecturer").
    pub title: String,
    /// The grade code (e.g. "SL").
    pub grade_code: String,
    /// The step within the grade.
    pub step: u32,
    /// Monthly basic salary for this grade and step.
    pub basic_salary: Decimal,
}

/// Whether an allowance counts towards taxable income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    /// Included in taxable income.
    Taxable,
    /// Paid in gross and net, excluded from taxable income.
    NonTaxable,
}

/// How an allowance amount is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllowanceRule {
    /// The amount on the employee's assignment is paid as-is.
    FixedAmount,
    /// A percentage of the employee's basic salary; the assignment amount is ignored.
    PercentOfBasic {
        /// Percentage of basic salary (e.g. 10 for 10%).
        percent: Decimal,
    },
}

/// A catalog entry for an allowance (housing, transport, teaching, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceType {
    /// Unique catalog code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Tax treatment of the allowance.
    pub tax_treatment: TaxTreatment,
    /// How the amount is computed.
    pub rule: AllowanceRule,
}

/// When a deduction is taken relative to tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionTiming {
    /// Reduces taxable income.
    PreTax,
    /// Taken from pay after tax.
    PostTax,
}

/// A catalog entry for a deduction (loans, union dues, ...).
///
/// Statutory contributions are configured separately and never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionType {
    /// Unique catalog code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the deduction is pre-tax or post-tax.
    pub timing: DeductionTiming,
}
