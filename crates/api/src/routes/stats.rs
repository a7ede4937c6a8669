//! Stats ingestion endpoint handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use domain::models::StatsReport;
use domain::services::IngestOutcome;
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::MethodPayload;
use crate::middleware::metrics::record_stats_rejected;

/// Body returned once a report is recorded.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
}

/// Body returned when the app or its version is unknown.
#[derive(Debug, Serialize)]
pub struct AppNotFoundBody {
    pub message: &'static str,
    pub error: &'static str,
}

impl AppNotFoundBody {
    pub const fn new() -> Self {
        Self {
            message: "App not found",
            error: "app_not_found",
        }
    }
}

/// Maps an ingestion outcome to its HTTP response.
fn outcome_response(outcome: IngestOutcome) -> axum::response::Response {
    match outcome {
        IngestOutcome::Recorded { .. } => {
            (StatusCode::OK, Json(StatusBody { status: "ok" })).into_response()
        }
        IngestOutcome::AppNotFound | IngestOutcome::VersionNotFound => {
            (StatusCode::OK, Json(AppNotFoundBody::new())).into_response()
        }
    }
}

/// Record a device usage report.
///
/// GET reads the report from the query string, POST/PUT/PATCH from the JSON body.
pub async fn record_stats(
    State(state): State<AppState>,
    payload: Result<MethodPayload<StatsReport>, ApiError>,
) -> Result<axum::response::Response, ApiError> {
    let MethodPayload(report) = payload.inspect_err(|e| {
        record_stats_rejected();
        tracing::debug!(error = %e, "Rejected stats payload");
    })?;

    if let Err(errors) = report.validate() {
        record_stats_rejected();
        return Err(errors.into());
    }

    tracing::debug!(
        app_id = %report.app_id,
        device_id = %report.device_id,
        action = %report.action(),
        "Stats report received"
    );

    let outcome = state.stats.ingest(report).await;
    Ok(outcome_response(outcome))
}
