//! Error types for the provider clients.

use cti_core::TargetType;
use thiserror::Error;

/// Errors that can occur while querying a threat-intelligence provider.
#[derive(Error, Debug)]
pub enum IntelError {
    /// Provider cannot look up this kind of target
    #[error("{provider} does not support {target_type} targets")]
    UnsupportedTarget {
        /// Provider name
        provider: String,
        /// Rejected target type
        target_type: TargetType,
    },

    /// API error with status code and a body that was not JSON
    #[error("API error ({provider}): status {status}, {message}")]
    ApiError {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Response parsing error
    #[error("failed to parse response from {provider}: {message}")]
    ParseError {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Timeout error
    #[error("request timed out after {seconds}s")]
    Timeout {
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, IntelError>;
