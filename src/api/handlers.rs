//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::{EmployeeFilter, RunOptions};
use crate::error::EngineError;
use crate::models::{PeriodKey, RunOutcome};

use super::request::{
    ActiveRequest, CalculationRequest, EmployeeQuery, PayslipQuery, RunRequest, StatusRequest,
};
use super::response::{ApiError, ApiErrorResponse, RunDetailResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/periods", get(list_periods_handler))
        .route("/periods/:year/:month/runs", post(run_period_handler))
        .route("/periods/:year/:month/close", post(close_period_handler))
        .route("/runs", get(list_runs_handler))
        .route("/runs/:run_id", get(get_run_handler))
        .route("/runs/:run_id/status", post(update_run_status_handler))
        .route("/runs/:run_id/payslips", get(list_run_payslips_handler))
        .route("/payslips/:payslip_id", get(get_payslip_handler))
        .route("/employees", get(list_employees_handler))
        .route(
            "/employees/:employee_id/active",
            post(set_employee_active_handler),
        )
        .route("/dashboard", get(dashboard_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        kind = ?err.kind(),
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn bad_request(error: ApiError) -> Response {
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Maps a JSON body rejection to a 400 response.
fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    bad_request(error)
}

/// Maps a path parameter rejection to a 400 response.
fn path_rejection_response(correlation_id: Uuid, rejection: PathRejection) -> Response {
    let message = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %message,
        "Invalid path parameter"
    );
    bad_request(ApiError::new("INVALID_PATH", message))
}

fn period_from_path(
    correlation_id: Uuid,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> Result<PeriodKey, Response> {
    let Path((year, month)) = path.map_err(|r| path_rejection_response(correlation_id, r))?;
    PeriodKey::new(year, month).map_err(|err| error_response(correlation_id, err))
}

/// Handler for POST /calculate.
///
/// Computes one employee's payslip without persisting it. The employee is
/// given inline or by roster id.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let period = match PeriodKey::new(request.year, request.month) {
        Ok(period) => period,
        Err(err) => return error_response(correlation_id, err),
    };

    let engine = state.engine().clone();
    let reference_date = request.reference_date;
    let start_time = Instant::now();
    let task = match (request.employee, request.employee_id) {
        (Some(employee), _) => tokio::task::spawn_blocking(move || {
            engine.preview(&employee, period, reference_date)
        }),
        (None, Some(employee_id)) => tokio::task::spawn_blocking(move || {
            engine.preview_employee(&employee_id, period, reference_date)
        }),
        (None, None) => {
            warn!(correlation_id = %correlation_id, "No employee in calculation request");
            return bad_request(ApiError::validation_error(
                "Either employee or employee_id is required",
            ));
        }
    };
    let result = task.await.unwrap_or_else(|e| {
        Err(EngineError::CalculationError {
            message: format!("computation task failed: {}", e),
        })
    });

    match result {
        Ok(computation) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %computation.employee_id,
                period = %period,
                gross_pay = %computation.gross_pay,
                net_pay = %computation.net_pay,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, computation)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /periods/{year}/{month}/runs.
///
/// Returns 201 with the run summary, or 200 with a warning when the period
/// is closed.
async fn run_period_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32)>, PathRejection>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let period = match period_from_path(correlation_id, path) {
        Ok(period) => period,
        Err(response) => return response,
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, period = %period, "Starting payroll run");

    let options: RunOptions = request.into();
    let start_time = Instant::now();
    match state.engine().run_period(period, options).await {
        Ok(RunOutcome::Completed(result)) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %result.run_id,
                processed = result.processed_count(),
                failed = result.failed_count(),
                skipped = result.skipped_count(),
                duration_ms = start_time.elapsed().as_millis(),
                "Payroll run completed"
            );
            json_response(StatusCode::CREATED, RunOutcome::Completed(result))
        }
        Ok(outcome @ RunOutcome::PeriodClosed { .. }) => {
            warn!(correlation_id = %correlation_id, period = %period, "Run requested for closed period");
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /periods/{year}/{month}/close.
async fn close_period_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let period = match period_from_path(correlation_id, path) {
        Ok(period) => period,
        Err(response) => return response,
    };

    match state.engine().close_period(period) {
        Ok(closed) => json_response(StatusCode::OK, closed),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /periods.
async fn list_periods_handler(State(state): State<AppState>) -> Response {
    match state.engine().periods() {
        Ok(periods) => json_response(StatusCode::OK, periods),
        Err(err) => error_response(Uuid::new_v4(), err),
    }
}

/// Handler for GET /runs.
async fn list_runs_handler(State(state): State<AppState>) -> Response {
    match state.engine().runs() {
        Ok(runs) => json_response(StatusCode::OK, runs),
        Err(err) => error_response(Uuid::new_v4(), err),
    }
}

/// Handler for GET /runs/{id}.
async fn get_run_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(run_id) = match path {
        Ok(path) => path,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.engine().run(run_id) {
        Ok((run, result)) => json_response(StatusCode::OK, RunDetailResponse { run, result }),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /runs/{id}/status.
async fn update_run_status_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(run_id) = match path {
        Ok(path) => path,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state.engine().transition_run(run_id, request.status) {
        Ok(run) => json_response(StatusCode::OK, run),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /runs/{id}/payslips.
async fn list_run_payslips_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    Query(query): Query<PayslipQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(run_id) = match path {
        Ok(path) => path,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state
        .engine()
        .run_payslips(run_id, query.employee_id, query.department)
    {
        Ok(payslips) => json_response(StatusCode::OK, payslips),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /payslips/{id}.
async fn get_payslip_handler(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(payslip_id) = match path {
        Ok(path) => path,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.engine().payslip(payslip_id) {
        Ok(payslip) => json_response(StatusCode::OK, payslip),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees.
async fn list_employees_handler(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> Response {
    let filter: EmployeeFilter = query.into();
    match state.engine().employees(&filter) {
        Ok(employees) => json_response(StatusCode::OK, employees),
        Err(err) => error_response(Uuid::new_v4(), err),
    }
}

/// Handler for POST /employees/{id}/active.
async fn set_employee_active_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    payload: Result<Json<ActiveRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state
        .engine()
        .set_employee_active(&employee_id, request.active)
    {
        Ok(employee) => json_response(StatusCode::OK, employee),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /dashboard.
async fn dashboard_handler(State(state): State<AppState>) -> Response {
    match state.engine().dashboard() {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => error_response(Uuid::new_v4(), err),
    }
}
