//! Threat level derived from a VirusTotal report.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Coarse verdict based on how many engines flagged the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    /// No engine flagged the target
    Clean,
    /// 1-2 detections
    Low,
    /// 3-5 detections
    Medium,
    /// More than 5 detections
    High,
    /// No usable report (missing or error payload)
    Unknown,
}

impl ThreatLevel {
    /// Assess a VirusTotal report payload.
    ///
    /// Reports without a numeric `positives` field count as zero detections,
    /// matching how VirusTotal omits it for targets with no scan results.
    #[must_use]
    pub fn from_report(report: Option<&Value>) -> Self {
        let Some(report) = report.filter(|r| r.is_object()) else {
            return Self::Unknown;
        };
        if report.get("error").is_some() {
            return Self::Unknown;
        }

        match report.get("positives").and_then(Value::as_u64).unwrap_or(0) {
            0 => Self::Clean,
            1..=2 => Self::Low,
            3..=5 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
