//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cti_scanner::ScanError;
use serde_json::json;
use thiserror::Error;

/// Message returned for every server-side fault. Details only go to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error returned by request handlers, rendered as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was malformed (400)
    #[error("{0}")]
    BadRequest(String),

    /// Something failed on our side (500); the payload is logged, not sent
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Validation(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
