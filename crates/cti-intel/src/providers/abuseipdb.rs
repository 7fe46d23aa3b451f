//! AbuseIPDB v2 API provider implementation.

use super::common::{build_http_client, join_endpoint, read_json_body, send};
use crate::error::{IntelError, Result};
use crate::provider::IntelProvider;
use async_trait::async_trait;
use cti_core::{classify, AbuseIpDbConfig, TargetType};
use reqwest::Client;
use serde_json::Value;

/// AbuseIPDB `check` lookups. IP addresses only.
pub struct AbuseIpDbProvider {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    max_age_days: u32,
    client: Client,
}

impl AbuseIpDbProvider {
    /// Create a provider from its configuration section.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &AbuseIpDbConfig) -> Result<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            max_age_days: config.max_age_days,
            client: build_http_client(config.timeout_secs)?,
        })
    }

    fn check_url(&self) -> String {
        join_endpoint(&self.base_url, "check")
    }
}

#[async_trait]
impl IntelProvider for AbuseIpDbProvider {
    fn provider_id(&self) -> &'static str {
        "abuseipdb"
    }

    fn supports(&self, target_type: TargetType) -> bool {
        target_type == TargetType::Ip
    }

    async fn lookup(&self, target: &str, target_type: TargetType) -> Result<Value> {
        // Re-derive the type from the target itself rather than trusting the caller.
        let actual = classify(target);
        if !self.supports(target_type) || !self.supports(actual) {
            return Err(IntelError::UnsupportedTarget {
                provider: self.provider_id().to_string(),
                target_type: actual,
            });
        }

        let url = self.check_url();
        tracing::debug!(%url, "querying AbuseIPDB");

        let max_age = self.max_age_days.to_string();
        let request = self
            .client
            .get(&url)
            .header("Key", &self.api_key)
            .header("Accept", "application/json")
            .query(&[
                ("ipAddress", target),
                ("maxAgeInDays", max_age.as_str()),
                ("verbose", ""),
            ]);

        let response = send(request, self.timeout_secs).await?;
        read_json_body(self.provider_id(), response, self.timeout_secs).await
    }
}
