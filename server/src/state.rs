//! Application state shared across request handlers.

use anyhow::Context;
use cti_core::AppConfig;
use cti_db::Database;
use cti_intel::{AbuseIpDbProvider, VirusTotalProvider};
use cti_scanner::ScanOrchestrator;
use std::sync::Arc;

/// State handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Runs scans and serves the scan log
    pub orchestrator: Arc<ScanOrchestrator>,
}

impl AppState {
    /// Wrap an already-built orchestrator.
    #[must_use]
    pub fn new(orchestrator: ScanOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Build the providers and open the scan log described by `config`.
    ///
    /// Missing API keys are not fatal: the provider answers with an error
    /// payload on every lookup instead.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.virustotal.api_key.is_empty() {
            tracing::warn!("VirusTotal API key is not configured; lookups will fail");
        }
        if config.abuseipdb.api_key.is_empty() {
            tracing::warn!("AbuseIPDB API key is not configured; ip lookups will fail");
        }

        let virustotal = VirusTotalProvider::new(&config.virustotal)
            .context("failed to build VirusTotal client")?;
        let abuseipdb = AbuseIpDbProvider::new(&config.abuseipdb)
            .context("failed to build AbuseIPDB client")?;

        let db = Database::open_and_migrate(&config.database.path)
            .await
            .with_context(|| format!("failed to open database {}", config.database.path))?;
        tracing::info!("Scan log: {}", config.database.path);

        Ok(Self::new(ScanOrchestrator::new(
            Arc::new(virustotal),
            Arc::new(abuseipdb),
            Arc::new(db),
        )))
    }
}
