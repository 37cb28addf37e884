//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading payroll configuration,
//! computing payslips and orchestrating payroll runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{PeriodKey, RunStatus};

/// The broad class an [`EngineError`] belongs to.
///
/// The orchestrator uses the kind to decide whether an error fails a single
/// employee or the whole run, and the API uses it to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or invalid tax brackets, statutory or catalog configuration.
    Configuration,
    /// An employee is missing required compensation data, or input is malformed.
    Validation,
    /// The operation conflicts with the current state of a period or run.
    State,
    /// An unexpected failure inside the engine.
    Internal,
}

/// The main error type for the Payroll Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/statutory.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/statutory.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration was readable but semantically invalid.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// A description of what is wrong.
        message: String,
    },

    /// No tax bracket table exists for the year being computed.
    #[error("No tax brackets configured for year {year}")]
    MissingTaxBrackets {
        /// The tax year.
        year: i32,
    },

    /// The bracket table for a year is not contiguous from zero.
    #[error("Invalid tax brackets for year {year}: {message}")]
    InvalidTaxBrackets {
        /// The tax year.
        year: i32,
        /// Which rule the table breaks.
        message: String,
    },

    /// An employee references an allowance type that is not in the catalog.
    #[error("Employee '{employee_id}' references unknown allowance type '{code}'")]
    UnknownAllowanceType {
        /// The employee holding the assignment.
        employee_id: String,
        /// The unknown catalog code.
        code: String,
    },

    /// An employee references a deduction type that is not in the catalog.
    #[error("Employee '{employee_id}' references unknown deduction type '{code}'")]
    UnknownDeductionType {
        /// The employee holding the assignment.
        employee_id: String,
        /// The unknown catalog code.
        code: String,
    },

    /// The employee has no grade step assigned.
    #[error("Employee '{employee_id}' has no grade step assigned")]
    MissingGradeStep {
        /// The employee without a grade.
        employee_id: String,
    },

    /// The employee's grade step does not exist in the grade table.
    #[error("Grade step {grade_code}-{step} for employee '{employee_id}' not found")]
    GradeStepNotFound {
        /// The employee referencing the grade.
        employee_id: String,
        /// The grade code.
        grade_code: String,
        /// The step within the grade.
        step: u32,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee '{employee_id}' field '{field}': {message}")]
    InvalidEmployee {
        /// The employee.
        employee_id: String,
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A period identifier could not be interpreted.
    #[error("Invalid payroll period '{input}': {message}")]
    InvalidPeriod {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        message: String,
    },

    /// Another run currently holds the period.
    #[error("A payroll run is already in progress for period {period}")]
    RunInProgress {
        /// The locked period.
        period: PeriodKey,
    },

    /// A payslip for this employee already exists in this run.
    #[error("Payslip for employee '{employee_id}' already exists in run {run_id}")]
    DuplicatePayslip {
        /// The run.
        run_id: Uuid,
        /// The employee.
        employee_id: String,
    },

    /// The run does not exist.
    #[error("Payroll run not found: {run_id}")]
    RunNotFound {
        /// The requested run id.
        run_id: Uuid,
    },

    /// The employee is not on the roster.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The requested employee id.
        employee_id: String,
    },

    /// The payslip does not exist.
    #[error("Payslip not found: {payslip_id}")]
    PayslipNotFound {
        /// The requested payslip id.
        payslip_id: Uuid,
    },

    /// The run cannot move to the requested status.
    #[error("Payroll run {run_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// The run.
        run_id: Uuid,
        /// Its current status.
        from: RunStatus,
        /// The requested status.
        to: RunStatus,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Classifies the error.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::error::{EngineError, ErrorKind};
    ///
    /// let error = EngineError::MissingGradeStep { employee_id: "emp_001".to_string() };
    /// assert_eq!(error.kind(), ErrorKind::Validation);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfiguration { .. }
            | EngineError::MissingTaxBrackets { .. }
            | EngineError::InvalidTaxBrackets { .. }
            | EngineError::UnknownAllowanceType { .. }
            | EngineError::UnknownDeductionType { .. } => ErrorKind::Configuration,
            EngineError::MissingGradeStep { .. }
            | EngineError::GradeStepNotFound { .. }
            | EngineError::InvalidEmployee { .. }
            | EngineError::InvalidPeriod { .. } => ErrorKind::Validation,
            EngineError::RunInProgress { .. }
            | EngineError::DuplicatePayslip { .. }
            | EngineError::RunNotFound { .. }
            | EngineError::EmployeeNotFound { .. }
            | EngineError::PayslipNotFound { .. }
            | EngineError::InvalidStatusTransition { .. } => ErrorKind::State,
            EngineError::CalculationError { .. } => ErrorKind::Internal,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
