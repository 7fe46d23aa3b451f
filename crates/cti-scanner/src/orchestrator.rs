//! Scan orchestrator.
//!
//! This module provides the `ScanOrchestrator` which runs one scan end to end
//! and serves the read side of the scan log.

use crate::error::{Result, ScanError};
use chrono::{DateTime, Utc};
use cti_core::{classify, TargetType};
use cti_db::{scans, Database, NewScan, ScanRecord, ScanStats, HISTORY_LIMIT};
use cti_intel::{IntelProvider, ThreatLevel};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Result of a single scan, as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Row id of the persisted scan
    #[serde(skip)]
    pub id: i64,
    /// Trimmed target
    pub target: String,
    /// Classification of the target
    pub target_type: TargetType,
    /// Primary provider payload (report or `{"error": ...}`)
    pub virustotal: Value,
    /// Reputation provider payload, `None` unless the target is an ip
    pub abuseipdb: Option<Value>,
    /// Verdict derived from the primary provider payload
    pub threat_level: ThreatLevel,
    /// Timestamp the scan log recorded for this scan
    pub scan_date: DateTime<Utc>,
}

/// Runs scans against the configured providers and records them.
pub struct ScanOrchestrator {
    /// Primary provider, queried for every target
    primary: Arc<dyn IntelProvider>,
    /// Reputation provider, queried for ip targets only
    reputation: Arc<dyn IntelProvider>,
    /// Scan log
    db: Arc<Database>,
}

impl ScanOrchestrator {
    /// Create a new scan orchestrator.
    #[must_use]
    pub fn new(
        primary: Arc<dyn IntelProvider>,
        reputation: Arc<dyn IntelProvider>,
        db: Arc<Database>,
    ) -> Self {
        Self {
            primary,
            reputation,
            db,
        }
    }

    /// The scan log this orchestrator writes to.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Scan a single target.
    ///
    /// Provider calls run one after the other. Provider failures are embedded
    /// in the outcome; only empty input and storage faults are errors.
    ///
    /// # Errors
    /// - `ScanError::Validation` if the target is empty after trimming
    /// - `ScanError::Database` if the scan cannot be recorded
    pub async fn scan(&self, raw_target: &str) -> Result<ScanOutcome> {
        let target = raw_target.trim();
        if target.is_empty() {
            return Err(ScanError::Validation("Target is required".to_string()));
        }

        let target_type = classify(target);
        tracing::info!(%target_type, "Scanning {}", target);

        let virustotal = self.primary.query(target, target_type).await;

        let abuseipdb = if target_type == TargetType::Ip {
            Some(self.reputation.query(target, target_type).await)
        } else {
            None
        };

        let scan = NewScan {
            target: target.to_string(),
            target_type,
            virustotal_result: Some(virustotal),
            abuseipdb_result: abuseipdb,
        };
        let stored = scans::append(self.db.pool(), &scan).await?;

        let NewScan {
            target,
            target_type,
            virustotal_result,
            abuseipdb_result,
        } = scan;
        let virustotal = virustotal_result.unwrap_or(Value::Null);
        let threat_level = ThreatLevel::from_report(Some(&virustotal));

        tracing::info!(
            id = stored.id,
            %target_type,
            %threat_level,
            "Scan of {} recorded",
            target
        );

        Ok(ScanOutcome {
            id: stored.id,
            target,
            target_type,
            virustotal,
            abuseipdb: abuseipdb_result,
            threat_level,
            scan_date: stored.scan_date,
        })
    }

    /// Most recent scans, newest first (at most [`HISTORY_LIMIT`]).
    ///
    /// # Errors
    /// Returns `ScanError::Database` if the log cannot be read.
    pub async fn history(&self) -> Result<Vec<ScanRecord>> {
        Ok(scans::recent(self.db.pool(), HISTORY_LIMIT).await?)
    }

    /// Totals over the whole scan log.
    ///
    /// # Errors
    /// Returns `ScanError::Database` if the log cannot be read.
    pub async fn stats(&self) -> Result<ScanStats> {
        Ok(scans::count_by_type(self.db.pool()).await?)
    }
}
