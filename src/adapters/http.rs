//! HTTP surface
//!
//! ```text
//! GET /api/working-days?date=<ISO8601Z>&days=<n>&hours=<n>
//! ```
//!
//! Query validation runs as an explicit step before the service is called and
//! collects every field issue into one `InvalidParameters` error.

use crate::core::service::WorkingDaysService;
use crate::domain::model::CalculationRequest;
use crate::utils::error::{AppError, ErrorCategory, Result};
use crate::utils::validation::{field_issue, parse_positive_number, parse_utc_instant};
use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// Raw query string values, before validation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WorkingDaysQuery {
    pub date: Option<String>,
    pub days: Option<String>,
    pub hours: Option<String>,
}

impl WorkingDaysQuery {
    pub fn into_request(self) -> Result<CalculationRequest> {
        let mut issues = Vec::new();

        let days = parse_positive_number("days", self.days.as_deref()).unwrap_or_else(|issue| {
            issues.push(issue);
            None
        });
        let hours = parse_positive_number("hours", self.hours.as_deref()).unwrap_or_else(|issue| {
            issues.push(issue);
            None
        });

        let start = match self.date.as_deref() {
            Some(raw) => match parse_utc_instant("date", raw) {
                Ok(instant) => Some(instant),
                Err(date_issues) => {
                    issues.extend(date_issues);
                    None
                }
            },
            None => None,
        };

        if self.days.is_none() && self.hours.is_none() {
            issues.push(field_issue(
                "days",
                "At least one of 'days' or 'hours' must be provided",
            ));
        }

        if !issues.is_empty() {
            return Err(AppError::InvalidParameters { issues });
        }

        CalculationRequest::from_deltas(start, days, hours)
    }
}

pub fn build_router(service: Arc<WorkingDaysService>) -> Router {
    let api = Router::new()
        .route("/working-days", get(calc_working_days))
        .with_state(service);

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(log_request))
}

async fn calc_working_days(
    State(service): State<Arc<WorkingDaysService>>,
    Query(query): Query<WorkingDaysQuery>,
) -> Result<Response> {
    let request = query.into_request()?;
    let result = service.calculate(&request, Utc::now()).await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        "{} {} {} - {:.3} ms",
        method,
        uri,
        response.status().as_u16(),
        started.elapsed().as_secs_f64() * 1000.0
    );
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidParameters { issues } => {
                tracing::warn!("Request validation failed: {:?}", issues);
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": "InvalidParameters",
                        "message": issues,
                    })),
                )
                    .into_response()
            }
            other => {
                tracing::error!(
                    "Request failed: {} (Category: {:?})",
                    other,
                    other.category()
                );
                let message = match other.category() {
                    ErrorCategory::Upstream | ErrorCategory::Internal => {
                        other.user_friendly_message()
                    }
                    _ => "Internal Server Error".to_string(),
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "message": message })),
                )
                    .into_response()
            }
        }
    }
}
