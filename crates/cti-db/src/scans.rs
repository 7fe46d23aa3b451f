//! Scan log operations.
//!
//! This module provides the append-only `scan_history` log: one insert path
//! and two read paths. Provider payloads are stored as serialized JSON text;
//! missing payloads are stored as SQL `NULL`.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use cti_core::TargetType;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{Pool, Row, Sqlite};

/// Number of records the history view returns.
pub const HISTORY_LIMIT: u32 = 50;

/// A scan about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScan {
    /// Trimmed target as submitted
    pub target: String,
    /// Classification at scan time
    pub target_type: TargetType,
    /// Primary provider payload
    pub virustotal_result: Option<JsonValue>,
    /// Reputation provider payload, `None` for non-ip targets
    pub abuseipdb_result: Option<JsonValue>,
}

/// Identity the store assigned to an appended scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredScan {
    /// Row identifier, strictly increasing
    pub id: i64,
    /// Insert time, the authoritative scan timestamp
    pub scan_date: DateTime<Utc>,
}

/// A persisted scan as returned by the history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRecord {
    /// Row identifier (not part of the history payload)
    #[serde(skip)]
    pub id: i64,
    /// Target as submitted
    pub target: String,
    /// Classification recorded at scan time
    pub target_type: TargetType,
    /// Primary provider payload
    pub virustotal_result: Option<JsonValue>,
    /// Reputation provider payload
    pub abuseipdb_result: Option<JsonValue>,
    /// When the scan was recorded
    pub scan_date: DateTime<Utc>,
}

/// Aggregate counts over the whole log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Every scan ever recorded
    pub total_scans: i64,
    /// Scans of IP addresses
    pub ip_scans: i64,
    /// Scans of domains
    pub domain_scans: i64,
    /// Scans of URLs
    pub url_scans: i64,
}

/// Append a scan to the log.
///
/// The store stamps `scan_date` with the current UTC time (microsecond
/// precision) and returns it along with the new row id.
///
/// # Errors
/// Returns `DatabaseError` if a payload cannot be serialized or the insert fails.
pub async fn append(pool: &Pool<Sqlite>, scan: &NewScan) -> Result<StoredScan> {
    let scan_date = Utc::now().trunc_subsecs(6);
    let virustotal = encode_payload(scan.virustotal_result.as_ref())?;
    let abuseipdb = encode_payload(scan.abuseipdb_result.as_ref())?;

    let result = sqlx::query(
        "INSERT INTO scan_history (target, target_type, virustotal_result, abuseipdb_result, scan_date)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&scan.target)
    .bind(scan.target_type.as_str())
    .bind(virustotal)
    .bind(abuseipdb)
    .bind(scan_date.to_rfc3339_opts(SecondsFormat::Micros, true))
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(id, target_type = %scan.target_type, "scan recorded");

    Ok(StoredScan { id, scan_date })
}

/// Most recent scans, newest first, at most `limit` of them.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a row cannot be decoded.
pub async fn recent(pool: &Pool<Sqlite>, limit: u32) -> Result<Vec<ScanRecord>> {
    let rows = sqlx::query(
        "SELECT id, target, target_type, virustotal_result, abuseipdb_result, scan_date
         FROM scan_history
         ORDER BY id DESC
         LIMIT ?",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter().map(parse_scan_row).collect()
}

/// Count scans in total and per target type.
///
/// Recomputed from the table on every call.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn count_by_type(pool: &Pool<Sqlite>) -> Result<ScanStats> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT target_type, COUNT(*) FROM scan_history GROUP BY target_type",
    )
    .fetch_all(pool)
    .await?;

    let mut stats = ScanStats::default();
    for (target_type, count) in rows {
        stats.total_scans += count;
        match target_type.parse::<TargetType>() {
            Ok(TargetType::Ip) => stats.ip_scans = count,
            Ok(TargetType::Domain) => stats.domain_scans = count,
            Ok(TargetType::Url) => stats.url_scans = count,
            Err(e) => tracing::warn!(count, error = %e, "unrecognised rows in scan_history"),
        }
    }

    Ok(stats)
}

/// `None` and JSON `null` both become SQL `NULL`.
fn encode_payload(payload: Option<&JsonValue>) -> Result<Option<String>> {
    match payload {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => serde_json::to_string(value)
            .map(Some)
            .map_err(|e| DatabaseError::SerializationError(e.to_string())),
    }
}

fn decode_payload(id: i64, column: &str, raw: Option<String>) -> Result<Option<JsonValue>> {
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| {
            DatabaseError::Decode(format!("invalid JSON in {column} of scan {id}: {e}"))
        })
    })
    .transpose()
}

fn parse_scan_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScanRecord> {
    let id: i64 = row.try_get("id")?;

    let target_type_str: String = row.try_get("target_type")?;
    let target_type = target_type_str
        .parse::<TargetType>()
        .map_err(|e| DatabaseError::Decode(format!("scan {id}: {e}")))?;

    let scan_date_str: String = row.try_get("scan_date")?;
    let scan_date = DateTime::parse_from_rfc3339(&scan_date_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::Decode(format!("invalid scan_date '{scan_date_str}' in scan {id}: {e}"))
        })?;

    Ok(ScanRecord {
        id,
        target: row.try_get("target")?,
        target_type,
        virustotal_result: decode_payload(id, "virustotal_result", row.try_get("virustotal_result")?)?,
        abuseipdb_result: decode_payload(id, "abuseipdb_result", row.try_get("abuseipdb_result")?)?,
        scan_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use serde_json::json;

    async fn setup_test_db() -> Database {
        // nosemgrep: no-unwrap-in-production
        let db = Database::new(":memory:").await.unwrap();
        // nosemgrep: no-unwrap-in-production
        db.run_migrations().await.unwrap();
        db
    }

    fn new_scan(target: &str, target_type: TargetType) -> NewScan {
        NewScan {
            target: target.to_string(),
            target_type,
            virustotal_result: Some(json!({"response_code": 1, "positives": 0})),
            abuseipdb_result: None,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let db = setup_test_db().await;

        let first = append(db.pool(), &new_scan("example.com", TargetType::Domain))
            .await
            .expect("append first");
        let second = append(db.pool(), &new_scan("example.org", TargetType::Domain))
            .await
            .expect("append second");

        assert!(second.id > first.id);
        assert!(second.scan_date >= first.scan_date);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_payloads() {
        let db = setup_test_db().await;

        let scan = NewScan {
            target: "8.8.8.8".to_string(),
            target_type: TargetType::Ip,
            virustotal_result: Some(json!({"asn": 15169, "detected_urls": []})),
            abuseipdb_result: Some(json!({"data": {"abuseConfidenceScore": 0}})),
        };
        let stored = append(db.pool(), &scan).await.expect("append scan");

        let records = recent(db.pool(), HISTORY_LIMIT).await.expect("read history");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id, stored.id);
        assert_eq!(record.target, "8.8.8.8");
        assert_eq!(record.target_type, TargetType::Ip);
        assert_eq!(record.virustotal_result, scan.virustotal_result);
        assert_eq!(record.abuseipdb_result, scan.abuseipdb_result);
        assert_eq!(record.scan_date, stored.scan_date);
    }

    #[tokio::test]
    async fn test_missing_payload_is_stored_as_sql_null() {
        let db = setup_test_db().await;

        let mut scan = new_scan("example.com", TargetType::Domain);
        scan.virustotal_result = Some(JsonValue::Null);
        let stored = append(db.pool(), &scan).await.expect("append scan");

        let (vt_is_null, abuse_is_null): (bool, bool) = sqlx::query_as(
            "SELECT virustotal_result IS NULL, abuseipdb_result IS NULL FROM scan_history WHERE id = ?",
        )
        .bind(stored.id)
        .fetch_one(db.pool())
        .await
        .expect("query null markers");
        assert!(vt_is_null);
        assert!(abuse_is_null);

        let records = recent(db.pool(), HISTORY_LIMIT).await.expect("read history");
        assert_eq!(records[0].virustotal_result, None);
        assert_eq!(records[0].abuseipdb_result, None);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let db = setup_test_db().await;

        for i in 0..55 {
            append(db.pool(), &new_scan(&format!("host{i}.example"), TargetType::Domain))
                .await
                .expect("append scan");
        }

        let records = recent(db.pool(), HISTORY_LIMIT).await.expect("read history");
        assert_eq!(records.len(), 50);
        assert_eq!(records[0].target, "host54.example");
        assert_eq!(records[49].target, "host5.example");
        assert!(records.windows(2).all(|w| w[0].id > w[1].id));

        let few = recent(db.pool(), 3).await.expect("read history");
        assert_eq!(few.len(), 3);
        assert_eq!(few[0].target, "host54.example");
    }

    #[tokio::test]
    async fn test_count_by_type() {
        let db = setup_test_db().await;

        for i in 0..3 {
            append(db.pool(), &new_scan(&format!("10.0.0.{i}"), TargetType::Ip))
                .await
                .expect("append ip");
        }
        for i in 0..2 {
            append(db.pool(), &new_scan(&format!("d{i}.example"), TargetType::Domain))
                .await
                .expect("append domain");
        }
        append(db.pool(), &new_scan("https://example.com", TargetType::Url))
            .await
            .expect("append url");

        let stats = count_by_type(db.pool()).await.expect("count scans");
        assert_eq!(
            stats,
            ScanStats {
                total_scans: 6,
                ip_scans: 3,
                domain_scans: 2,
                url_scans: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_count_by_type_empty_log() {
        let db = setup_test_db().await;
        let stats = count_by_type(db.pool()).await.expect("count scans");
        assert_eq!(stats, ScanStats::default());
    }

    #[tokio::test]
    async fn test_empty_target_rejected_by_schema() {
        let db = setup_test_db().await;
        let result = append(db.pool(), &new_scan("", TargetType::Domain)).await;
        assert!(matches!(result, Err(DatabaseError::Sqlx(_))));
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_decode_error() {
        let db = setup_test_db().await;

        sqlx::query(
            "INSERT INTO scan_history (target, target_type, virustotal_result, scan_date)
             VALUES ('example.com', 'domain', '{not json', '2026-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .expect("insert corrupt row");

        let result = recent(db.pool(), HISTORY_LIMIT).await;
        match result {
            Err(DatabaseError::Decode(msg)) => assert!(msg.contains("virustotal_result")),
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_history_serialization_shape() {
        let record = ScanRecord {
            id: 7,
            target: "example.com".to_string(),
            target_type: TargetType::Domain,
            virustotal_result: Some(json!({"positives": 1})),
            abuseipdb_result: None,
            scan_date: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("valid date")
                .with_timezone(&Utc),
        };

        let value = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(
            value,
            json!({
                "target": "example.com",
                "target_type": "domain",
                "virustotal_result": {"positives": 1},
                "abuseipdb_result": null,
                "scan_date": "2026-01-01T00:00:00Z"
            })
        );
    }
}
