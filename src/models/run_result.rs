//! Summary of a payroll run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditWarning, PayrollRun, PeriodKey, Payslip};
use crate::error::{EngineError, ErrorKind};

/// An employee left out of a run because they were inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEmployee {
    /// The employee.
    pub employee_id: String,
    /// Why the employee was skipped.
    pub reason: String,
}

/// An employee whose computation or commit failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// The employee.
    pub employee_id: String,
    /// The class of error.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
}

impl EmployeeFailure {
    /// Records an engine error against an employee.
    pub fn new(employee_id: impl Into<String>, error: &EngineError) -> Self {
        Self {
            employee_id: employee_id.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Money totals over the committed payslips of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Sum of gross pay.
    pub gross_pay: Decimal,
    /// Sum of tax.
    pub tax: Decimal,
    /// Sum of employee statutory contributions.
    pub statutory_employee: Decimal,
    /// Sum of employer statutory contributions.
    pub statutory_employer: Decimal,
    /// Sum of total deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub net_pay: Decimal,
}

impl RunTotals {
    fn add(&mut self, payslip: &Payslip) {
        self.gross_pay += payslip.gross_pay;
        self.tax += payslip.tax;
        self.statutory_employee += payslip.statutory_employee;
        self.statutory_employer += payslip.statutory_employer;
        self.total_deductions += payslip.total_deductions;
        self.net_pay += payslip.net_pay;
    }
}

/// The summary of one payroll run.
///
/// Every active employee ends up in exactly one of `processed`, `failed` or
/// `not_attempted`; every inactive employee is listed in `skipped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// The run.
    pub run_id: Uuid,
    /// The period the run covers.
    pub period: PeriodKey,
    /// The date rates were resolved at.
    pub reference_date: NaiveDate,
    /// Employees whose computation was attempted.
    pub attempted: usize,
    /// Employee ids with a committed payslip.
    pub processed: Vec<String>,
    /// Inactive employees.
    pub skipped: Vec<SkippedEmployee>,
    /// Failed employees with reasons.
    pub failed: Vec<EmployeeFailure>,
    /// Active employees not reached because the run was cancelled.
    pub not_attempted: Vec<String>,
    /// Whether the run stopped at a cancellation checkpoint.
    pub cancelled: bool,
    /// Configuration warnings raised while resolving rates.
    pub warnings: Vec<AuditWarning>,
    /// Money totals over committed payslips.
    pub totals: RunTotals,
}

impl RunResult {
    /// Starts an empty summary for a run.
    pub fn new(run: &PayrollRun) -> Self {
        Self {
            run_id: run.id,
            period: run.period,
            reference_date: run.reference_date,
            attempted: 0,
            processed: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            not_attempted: Vec::new(),
            cancelled: false,
            warnings: Vec::new(),
            totals: RunTotals::default(),
        }
    }

    /// Records a committed payslip.
    pub fn record_success(&mut self, payslip: &Payslip) {
        self.attempted += 1;
        self.processed.push(payslip.employee_id.clone());
        self.totals.add(payslip);
    }

    /// Records a failed employee.
    pub fn record_failure(&mut self, employee_id: impl Into<String>, error: &EngineError) {
        self.attempted += 1;
        self.failed.push(EmployeeFailure::new(employee_id, error));
    }

    /// Number of committed payslips.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Number of inactive employees left out.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of failed employees.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// What `run_period` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The run executed; see the summary for per-employee results.
    Completed(RunResult),
    /// The period was already closed; nothing was created.
    PeriodClosed {
        /// The closed period.
        period: PeriodKey,
        /// Human-readable warning.
        warning: String,
    },
}

impl RunOutcome {
    /// Returns the run summary if the run executed.
    pub fn result(&self) -> Option<&RunResult> {
        match self {
            RunOutcome::Completed(result) => Some(result),
            RunOutcome::PeriodClosed { .. } => None,
        }
    }
}
