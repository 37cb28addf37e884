//! HTTP API module for the Payroll Engine.
//!
//! This module exposes payslip previews, payroll runs, period and run
//! lifecycle, roster listing and a dashboard over REST.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ActiveRequest, CalculationRequest, EmployeeQuery, PayslipQuery, RunRequest, StatusRequest,
};
pub use response::{ApiError, ApiErrorResponse, RunDetailResponse};
pub use state::AppState;
