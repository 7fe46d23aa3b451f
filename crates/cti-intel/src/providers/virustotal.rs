//! VirusTotal v2 API provider implementation.

use super::common::{build_http_client, join_endpoint, read_json_body, send};
use crate::error::Result;
use crate::provider::IntelProvider;
use async_trait::async_trait;
use cti_core::{TargetType, VirusTotalConfig};
use reqwest::Client;
use serde_json::Value;

/// VirusTotal report lookups.
///
/// Each target type has its own report endpoint and parameter name. The API
/// key travels as the `apikey` query parameter.
pub struct VirusTotalProvider {
    api_key: String,
    base_url: String,
    timeout_secs: u64,
    client: Client,
}

impl VirusTotalProvider {
    /// Create a provider from its configuration section.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &VirusTotalConfig) -> Result<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            client: build_http_client(config.timeout_secs)?,
        })
    }

    /// Report endpoint and query parameter name for a target type.
    fn endpoint(&self, target_type: TargetType) -> (String, &'static str) {
        let (path, param) = match target_type {
            TargetType::Ip => ("ip-address/report", "ip"),
            TargetType::Domain => ("domain/report", "domain"),
            TargetType::Url => ("url/report", "resource"),
        };
        (join_endpoint(&self.base_url, path), param)
    }
}

#[async_trait]
impl IntelProvider for VirusTotalProvider {
    fn provider_id(&self) -> &'static str {
        "virustotal"
    }

    fn supports(&self, _target_type: TargetType) -> bool {
        true
    }

    async fn lookup(&self, target: &str, target_type: TargetType) -> Result<Value> {
        let (url, param) = self.endpoint(target_type);
        tracing::debug!(%url, %target_type, "querying VirusTotal");

        let request = self
            .client
            .get(&url)
            .query(&[("apikey", self.api_key.as_str()), (param, target)]);

        let response = send(request, self.timeout_secs).await?;
        read_json_body(self.provider_id(), response, self.timeout_secs).await
    }
}
