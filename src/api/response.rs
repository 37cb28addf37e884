//! Response types for the Payroll Engine API.
//!
//! This module defines the error response structures and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};
use crate::models::{PayrollRun, RunResult};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// A run together with its summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDetailResponse {
    /// The run.
    pub run: PayrollRun,
    /// The run summary, absent while the run is still executing.
    pub result: Option<RunResult>,
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// The machine-readable code for an engine error.
fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::ConfigNotFound { .. }
        | EngineError::ConfigParseError { .. }
        | EngineError::InvalidConfiguration { .. } => "CONFIG_ERROR",
        EngineError::MissingTaxBrackets { .. } => "MISSING_TAX_BRACKETS",
        EngineError::InvalidTaxBrackets { .. } => "INVALID_TAX_BRACKETS",
        EngineError::UnknownAllowanceType { .. } => "UNKNOWN_ALLOWANCE_TYPE",
        EngineError::UnknownDeductionType { .. } => "UNKNOWN_DEDUCTION_TYPE",
        EngineError::MissingGradeStep { .. } => "MISSING_GRADE_STEP",
        EngineError::GradeStepNotFound { .. } => "GRADE_STEP_NOT_FOUND",
        EngineError::InvalidEmployee { .. } => "INVALID_EMPLOYEE",
        EngineError::InvalidPeriod { .. } => "INVALID_PERIOD",
        EngineError::RunInProgress { .. } => "RUN_IN_PROGRESS",
        EngineError::DuplicatePayslip { .. } => "DUPLICATE_PAYSLIP",
        EngineError::RunNotFound { .. } => "RUN_NOT_FOUND",
        EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
        EngineError::PayslipNotFound { .. } => "PAYSLIP_NOT_FOUND",
        EngineError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
        EngineError::CalculationError { .. } => "CALCULATION_ERROR",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error_code(&error);
        let message = error.to_string();

        let (status, details) = match &error {
            EngineError::RunNotFound { .. }
            | EngineError::EmployeeNotFound { .. }
            | EngineError::PayslipNotFound { .. } => (StatusCode::NOT_FOUND, None),
            EngineError::InvalidPeriod { .. } => (StatusCode::BAD_REQUEST, None),
            _ => match error.kind() {
                ErrorKind::Validation => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Some("The employee's compensation data is incomplete or invalid"),
                ),
                ErrorKind::State => (StatusCode::CONFLICT, None),
                ErrorKind::Configuration => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Some("The payroll configuration does not support this computation"),
                ),
                ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, None),
            },
        };

        let error = match details {
            Some(details) => ApiError::with_details(code, message, details),
            None => ApiError::new(code, message),
        };
        ApiErrorResponse { status, error }
    }
}
