//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod catalog;
mod employee;
mod pay_period;
mod run_result;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, LineComponent, LineKind, PayComputation, Payslip,
    PayslipLine,
};
pub use catalog::{
    AllowanceRule, AllowanceType, DeductionTiming, DeductionType, GradeStep, TaxTreatment,
};
pub use employee::{Employee, EmployeeAllowance, EmployeeDeduction, EmploymentType, GradeRef};
pub use pay_period::{PayrollPeriod, PayrollRun, PeriodKey, RunStatus};
pub use run_result::{EmployeeFailure, RunOutcome, RunResult, RunTotals, SkippedEmployee};
