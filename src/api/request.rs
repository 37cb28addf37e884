//! Request types for the Payroll Engine API.
//!
//! This module defines the JSON bodies and query strings accepted by the
//! API endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::{EmployeeFilter, RunOptions, DEFAULT_CREATED_BY};
use crate::models::{Employee, RunStatus};

/// Request body for the `/calculate` endpoint.
///
/// Identifies the employee either inline or by roster id, and the period to
/// preview. Nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The employee to compute, given inline.
    #[serde(default)]
    pub employee: Option<Employee>,
    /// The roster id of the employee to compute.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Calendar year of the period.
    pub year: i32,
    /// Calendar month of the period, 1-12.
    pub month: u32,
    /// Date to resolve statutory rates at; defaults to the period start.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

/// Request body for `POST /periods/{year}/{month}/runs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    /// Who is starting the run.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Date to resolve statutory rates at; defaults to the period start.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

impl From<RunRequest> for RunOptions {
    fn from(req: RunRequest) -> Self {
        RunOptions {
            reference_date: req.reference_date,
            created_by: req
                .created_by
                .unwrap_or_else(|| DEFAULT_CREATED_BY.to_string()),
            cancel: None,
        }
    }
}

/// Request body for `POST /runs/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    /// The status to move the run to.
    pub status: RunStatus,
}

/// Request body for `POST /employees/{id}/active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRequest {
    /// Whether the employee takes part in future runs.
    pub active: bool,
}

/// Query string for `GET /runs/{id}/payslips`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayslipQuery {
    /// Only this employee's payslip.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// Only payslips from this department.
    #[serde(default)]
    pub department: Option<String>,
}

/// Query string for `GET /employees`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
    /// Case-insensitive substring of the full name.
    #[serde(default)]
    pub name: Option<String>,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
    /// Only active or only inactive employees.
    #[serde(default)]
    pub active: Option<bool>,
}

impl From<EmployeeQuery> for EmployeeFilter {
    fn from(query: EmployeeQuery) -> Self {
        EmployeeFilter {
            name: query.name,
            department: query.department,
            active: query.active,
        }
    }
}
