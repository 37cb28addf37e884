//! Calculation result models for the Payroll Engine.
//!
//! This module contains the [`PayComputation`] produced for one employee, the
//! persisted [`Payslip`] built from it, the itemized [`PayslipLine`]s, and the
//! audit trace types that record every calculation decision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PeriodKey;

/// Represents how a payslip line affects pay.
///
/// # Example
///
/// ```
/// use payroll_engine::models::LineKind;
///
/// let kind = LineKind::Earning;
/// assert_eq!(format!("{:?}", kind), "Earning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Adds to gross pay.
    Earning,
    /// Counts towards total deductions (tax, employee statutory, post-tax deductions).
    Deduction,
    /// A pre-tax deduction: reduces taxable income only.
    PreTaxRelief,
    /// Paid by the employer on top of gross; does not affect net pay.
    EmployerContribution,
}

/// The payroll component a line was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineComponent {
    /// Basic salary from the grade step.
    Basic,
    /// A catalog allowance.
    Allowance,
    /// A pre-tax catalog deduction.
    PreTaxDeduction,
    /// A post-tax catalog deduction.
    PostTaxDeduction,
    /// A statutory contribution.
    Statutory,
    /// Progressive income tax.
    Tax,
}

/// An itemized earning or deduction row on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipLine {
    /// How the line affects pay.
    pub kind: LineKind,
    /// The component that produced the line.
    pub component: LineComponent,
    /// Catalog or rule code (e.g. "housing", "paye").
    pub code: String,
    /// Human-readable label.
    pub label: String,
    /// The amount, rounded to the cent.
    pub amount: Decimal,
}

impl PayslipLine {
    /// Creates a new line.
    pub fn new(
        kind: LineKind,
        component: LineComponent,
        code: impl Into<String>,
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            kind,
            component,
            code: code.into(),
            label: label.into(),
            amount,
        }
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a computation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
/// };
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The pure result of computing one employee's pay for a period.
///
/// Produced without side effects; turned into a [`Payslip`] when a run
/// commits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayComputation {
    /// The employee the computation is for.
    pub employee_id: String,
    /// Employee display name at computation time.
    pub employee_name: String,
    /// Department at computation time.
    pub department: String,
    /// The period computed.
    pub period: PeriodKey,
    /// Grade code at computation time.
    pub grade_code: String,
    /// Grade step at computation time.
    pub step: u32,
    /// Basic salary captured at computation time.
    pub basic_salary: Decimal,
    /// Basic salary plus all allowances.
    pub gross_pay: Decimal,
    /// Allowances excluded from taxable income.
    pub non_taxable_earnings: Decimal,
    /// Deductions that reduce taxable income.
    pub pre_tax_deductions: Decimal,
    /// The amount the tax table was applied to.
    pub taxable_income: Decimal,
    /// Progressive income tax.
    pub tax: Decimal,
    /// Employee share of statutory contributions.
    pub statutory_employee: Decimal,
    /// Employer share of statutory contributions.
    pub statutory_employer: Decimal,
    /// Deductions taken after tax.
    pub post_tax_deductions: Decimal,
    /// Tax + employee statutory + post-tax deductions.
    pub total_deductions: Decimal,
    /// Gross minus total deductions.
    pub net_pay: Decimal,
    /// Itemized lines.
    pub lines: Vec<PayslipLine>,
    /// Every calculation decision.
    pub audit_trace: AuditTrace,
}

impl PayComputation {
    /// Sum of all lines of the given kind.
    pub fn line_total(&self, kind: LineKind) -> Decimal {
        self.lines
            .iter()
            .filter(|line| line.kind == kind)
            .map(|line| line.amount)
            .sum()
    }

    /// Attaches the computation to a run, producing an immutable payslip.
    pub fn into_payslip(self, run_id: Uuid) -> Payslip {
        Payslip {
            id: Uuid::new_v4(),
            run_id,
            created_at: Utc::now(),
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            department: self.department,
            period: self.period,
            grade_code: self.grade_code,
            step: self.step,
            basic_salary: self.basic_salary,
            gross_pay: self.gross_pay,
            non_taxable_earnings: self.non_taxable_earnings,
            pre_tax_deductions: self.pre_tax_deductions,
            taxable_income: self.taxable_income,
            tax: self.tax,
            statutory_employee: self.statutory_employee,
            statutory_employer: self.statutory_employer,
            post_tax_deductions: self.post_tax_deductions,
            total_deductions: self.total_deductions,
            net_pay: self.net_pay,
            lines: self.lines,
            audit_trace: self.audit_trace,
        }
    }
}

/// The finalized result for one employee in one run.
///
/// There is no operation that changes a payslip after it is committed;
/// corrections require a new run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique payslip identifier.
    pub id: Uuid,
    /// The run that produced the payslip.
    pub run_id: Uuid,
    /// When the payslip was created.
    pub created_at: DateTime<Utc>,
    /// The employee.
    pub employee_id: String,
    /// Employee display name at computation time.
    pub employee_name: String,
    /// Department at computation time.
    pub department: String,
    /// The period paid.
    pub period: PeriodKey,
    /// Grade code at computation time.
    pub grade_code: String,
    /// Grade step at computation time.
    pub step: u32,
    /// Basic salary captured at computation time.
    pub basic_salary: Decimal,
    /// Basic salary plus all allowances.
    pub gross_pay: Decimal,
    /// Allowances excluded from taxable income.
    pub non_taxable_earnings: Decimal,
    /// Deductions that reduce taxable income.
    pub pre_tax_deductions: Decimal,
    /// The amount the tax table was applied to.
    pub taxable_income: Decimal,
    /// Progressive income tax.
    pub tax: Decimal,
    /// Employee share of statutory contributions.
    pub statutory_employee: Decimal,
    /// Employer share of statutory contributions.
    pub statutory_employer: Decimal,
    /// Deductions taken after tax.
    pub post_tax_deductions: Decimal,
    /// Tax + employee statutory + post-tax deductions.
    pub total_deductions: Decimal,
    /// Gross minus total deductions.
    pub net_pay: Decimal,
    /// Itemized lines.
    pub lines: Vec<PayslipLine>,
    /// Every calculation decision.
    pub audit_trace: AuditTrace,
}
