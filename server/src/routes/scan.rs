//! Scan, history and statistics handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use cti_db::{ScanRecord, ScanStats};
use cti_scanner::ScanOutcome;
use serde::Deserialize;

/// Body of `POST /api/scan`.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// IP address, domain or URL. Missing is treated like empty.
    #[serde(default)]
    pub target: Option<String>,
}

/// `POST /api/scan`
pub async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanOutcome>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected scan request body");
        ApiError::BadRequest(rejection_message(&rejection).to_string())
    })?;

    let target = request.target.unwrap_or_default();
    let outcome = state.orchestrator.scan(&target).await?;
    Ok(Json(outcome))
}

/// Client-facing reason for an unusable scan request body.
fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => {
            "Request body must be a JSON object with a string target"
        }
        JsonRejection::MissingJsonContentType(_) => "Content-Type must be application/json",
        _ => "Invalid JSON body",
    }
}

/// `GET /api/history`
pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<ScanRecord>>, ApiError> {
    Ok(Json(state.orchestrator.history().await?))
}

/// `GET /api/stats`
pub async fn stats(State(state): State<AppState>) -> Result<Json<ScanStats>, ApiError> {
    Ok(Json(state.orchestrator.stats().await?))
}
