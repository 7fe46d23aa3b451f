//! Common utilities shared across providers.

use crate::error::{IntelError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;

/// Longest slice of a non-JSON error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Build an HTTP client whose requests give up after `timeout_secs`.
///
/// # Errors
/// Returns error if the HTTP client cannot be created.
pub fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("cti-dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| IntelError::Internal(format!("failed to create HTTP client: {e}")))
}

/// Join a configured base URL and an endpoint path with exactly one slash.
#[must_use]
pub fn join_endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Client timeouts become [`IntelError::Timeout`], everything else
/// [`IntelError::Network`].
fn transport_error(err: reqwest::Error, timeout_secs: u64) -> IntelError {
    if err.is_timeout() {
        IntelError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        IntelError::Network(err)
    }
}

/// Send a request, reporting timeouts as [`IntelError::Timeout`].
pub async fn send(request: RequestBuilder, timeout_secs: u64) -> Result<Response> {
    request
        .send()
        .await
        .map_err(|e| transport_error(e, timeout_secs))
}

/// Read a response body as JSON.
///
/// A JSON body is returned whatever the status code, since both providers
/// describe their own errors in JSON. A non-JSON body is an `ApiError` when
/// the status is not a success, and a `ParseError` otherwise. The client
/// timeout still applies while the body streams in.
pub async fn read_json_body(
    provider: &str,
    response: Response,
    timeout_secs: u64,
) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, timeout_secs))?;

    match serde_json::from_str::<Value>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(IntelError::ApiError {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body.chars().take(MAX_ERROR_BODY_CHARS).collect()
            },
        }),
        Err(e) => Err(IntelError::ParseError {
            provider: provider.to_string(),
            message: format!("response body is not JSON (status {status}): {e}"),
        }),
    }
}
