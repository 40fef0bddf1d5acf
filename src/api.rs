//! HTTP API for the payroll engine.
//!
//! This module exposes a small REST API around the engine using the
//! [`axum`](https://crates.io/crates/axum) framework:
//!
//! * `POST /api/salary` - compute a [`SalaryBreakdown`] from explicit inputs
//! * `POST /api/payroll` - run payroll for a [`PayPeriod`] over the data directory
//! * `GET /api/employees/:id/months` - months with attendance for an employee
//! * `GET /api/employees/:id/report?year=&month=` (or `&week=`) - text report
//!
//! The data files are re-read on every request that needs them, so each
//! computation sees one consistent snapshot and nothing is cached
//! between requests.

use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::attendance::months_with_attendance;
use crate::config::Settings;
use crate::deductions::StatutoryCalculator;
use crate::engine::PayrollEngine;
use crate::error::PayrollError;
use crate::models::{PayPeriod, PayRunResult, PayrollSnapshot, SalaryBreakdown};
use crate::report::render_weekly_report;
use crate::salary::{SalaryAggregator, SalaryRequest};
use crate::store::load_snapshot;

/// Application state shared across requests.
pub struct AppState {
    pub engine: PayrollEngine,
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        let aggregator = SalaryAggregator::new(settings.policy.pay, Arc::new(StatutoryCalculator));
        Self {
            engine: PayrollEngine::new(settings.policy.shift, aggregator),
            data_dir: settings.data_dir.clone(),
        }
    }

    async fn snapshot(&self) -> Result<PayrollSnapshot, ApiError> {
        let data_dir = self.data_dir.clone();
        let snapshot = tokio::task::spawn_blocking(move || load_snapshot(&data_dir)).await??;
        Ok(snapshot)
    }
}

/// An error rendered as `{"error": "..."}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: anyhow::Error,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow!(message.into()),
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        let error = err.into();
        let status = match error.downcast_ref::<PayrollError>() {
            Some(PayrollError::EmployeeNotFound { .. }) => StatusCode::NOT_FOUND,
            Some(
                PayrollError::TimeFormat { .. }
                | PayrollError::NumericParse { .. }
                | PayrollError::InvalidAmount { .. },
            ) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("request failed: {:#}", self.error);
        }
        let body = Json(serde_json::json!({"error": self.error.to_string()}));
        (self.status, body).into_response()
    }
}

/// Query string of the report endpoint.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub year: i32,
    pub month: Option<u32>,
    pub week: Option<u32>,
}

impl ReportQuery {
    pub fn period(&self) -> Option<PayPeriod> {
        match (self.month, self.week) {
            (Some(month), None) if (1..=12).contains(&month) => Some(PayPeriod::Month { year: self.year, month }),
            (None, Some(week)) if (1..=53).contains(&week) => Some(PayPeriod::Week { year: self.year, week }),
            _ => None,
        }
    }
}

/// Build the API router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/salary", post(salary_handler))
        .route("/api/payroll", post(payroll_handler))
        .route("/api/employees/:id/months", get(months_handler))
        .route("/api/employees/:id/report", get(report_handler))
        .with_state(state)
}

/// Handler for POST /api/salary
async fn salary_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SalaryRequest>,
) -> Result<Json<SalaryBreakdown>, ApiError> {
    request.validate()?;
    Ok(Json(app_state.engine.aggregator().compute(&request)))
}

/// Handler for POST /api/payroll
async fn payroll_handler(
    State(app_state): State<Arc<AppState>>,
    Json(period): Json<PayPeriod>,
) -> Result<Json<PayRunResult>, ApiError> {
    let snapshot = app_state.snapshot().await?;
    Ok(Json(app_state.engine.run_payroll(&snapshot, period)))
}

/// Handler for GET /api/employees/:id/months
async fn months_handler(
    State(app_state): State<Arc<AppState>>,
    Path(employee_id): Path<String>,
) -> Result<Json<Vec<(i32, u32)>>, ApiError> {
    let snapshot = app_state.snapshot().await?;
    if !snapshot.employees.iter().any(|e| e.id == employee_id) {
        return Err(PayrollError::EmployeeNotFound { id: employee_id }.into());
    }
    Ok(Json(months_with_attendance(&snapshot.attendance, &employee_id)))
}

/// Handler for GET /api/employees/:id/report
async fn report_handler(
    State(app_state): State<Arc<AppState>>,
    Path(employee_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<String, ApiError> {
    let period = query
        .period()
        .ok_or_else(|| ApiError::bad_request("give exactly one of month (1-12) or week (1-53)"))?;
    let snapshot = app_state.snapshot().await?;
    let result = app_state.engine.run_for_employee(&snapshot, &employee_id, period)?;
    Ok(render_weekly_report(&result))
}

/// Launch the API server.  Binds to `settings.bind_addr` and runs
/// until the server terminates.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_settings(settings));
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    info!(
        "Server listening on {} (data dir {})",
        settings.bind_addr,
        settings.data_dir.display()
    );
    axum::serve(listener, router).await?;
    Ok(())
}
