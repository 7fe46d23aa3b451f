//! Core provider trait.

use crate::error::{IntelError, Result};
use async_trait::async_trait;
use cti_core::TargetType;
use serde_json::{json, Value};

/// Payload message returned when a provider is asked about a target type it
/// does not cover.
pub const UNSUPPORTED_TARGET_MESSAGE: &str = "not supported for this target type";

/// Trait for threat-intelligence providers.
///
/// Implementations only need [`lookup`](Self::lookup); callers use
/// [`query`](Self::query), which never fails. Providers must be thread-safe
/// (Send + Sync) to be shared across request handlers.
#[async_trait]
pub trait IntelProvider: Send + Sync {
    /// Get the unique identifier for this provider.
    fn provider_id(&self) -> &str;

    /// Whether this provider can look up targets of `target_type`.
    fn supports(&self, target_type: TargetType) -> bool;

    /// Perform one request against the provider.
    ///
    /// # Errors
    /// Returns error on unsupported targets, network failures, timeouts and
    /// unparsable responses.
    async fn lookup(&self, target: &str, target_type: TargetType) -> Result<Value>;

    /// Look up `target` and fold every failure into the returned payload.
    ///
    /// Unsupported target types short-circuit to a `{"message": ...}` payload
    /// without touching the network. Errors become `{"error": ...}`.
    async fn query(&self, target: &str, target_type: TargetType) -> Value {
        if !self.supports(target_type) {
            return unsupported_payload();
        }

        match self.lookup(target, target_type).await {
            Ok(body) => body,
            Err(IntelError::UnsupportedTarget { .. }) => unsupported_payload(),
            Err(e) => {
                tracing::warn!(
                    provider = self.provider_id(),
                    %target_type,
                    error = %e,
                    "provider lookup failed"
                );
                json!({ "error": e.to_string() })
            }
        }
    }
}

fn unsupported_payload() -> Value {
    json!({ "message": UNSUPPORTED_TARGET_MESSAGE })
}
