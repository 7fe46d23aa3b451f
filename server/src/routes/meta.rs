use crate::state::AppState;
use crate::{SERVICE_NAME, VERSION};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use cti_db::latest_schema_version;
use serde_json::{json, Value};

/// Routes listed by the service index.
pub const ENDPOINTS: [&str; 5] = [
    "POST /api/scan",
    "GET /api/history",
    "GET /api/stats",
    "GET /health",
    "GET /",
];

/// `GET /health`
///
/// Reports `unhealthy` with 503 when the scan log cannot be reached or its
/// schema is behind this build.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let expected = latest_schema_version();
    let schema_version = match state.orchestrator.database().schema_version().await {
        Ok(version) => Some(version),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            None
        }
    };

    let (status, label) = match schema_version {
        Some(version) if version >= expected => (StatusCode::OK, "healthy"),
        Some(version) => {
            tracing::warn!(version, expected, "scan log schema is out of date");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
        None => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": SERVICE_NAME,
            "version": VERSION,
            "schema_version": schema_version,
        })),
    )
}

/// `GET /`
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": VERSION,
        "endpoints": ENDPOINTS,
    }))
}
