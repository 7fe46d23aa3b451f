//! HTTP routing.

mod meta;
mod scan;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(meta::index))
        .route("/health", get(meta::health))
        .route("/api/scan", post(scan::scan))
        .route("/api/history", get(scan::history))
        .route("/api/stats", get(scan::stats))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
