//! CTI Database Layer
//!
//! Provides `SQLite` storage for the scan log using `SQLx` with embedded
//! migrations.
//!
//! # Architecture
//!
//! - **Append-only**: `scan_history` rows are inserted once and never updated
//! - **Migrations**: SQL files under `migrations/` are embedded at compile
//!   time; `_sqlx_migrations` records which ones a database has applied
//! - **Connection Pooling**: a small pool; every operation is one statement,
//!   so no transaction spans more than one logical operation
//!
//! # Example
//!
//! ```ignore
//! use cti_db::{scans, Database};
//!
//! let db = Database::open_and_migrate("database.db").await?;
//! let stats = scans::count_by_type(db.pool()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod scans;

// Re-export commonly used types
pub use connection::ConnectionPool;
pub use error::{DatabaseError, Result};
pub use scans::{NewScan, ScanRecord, ScanStats, StoredScan, HISTORY_LIMIT};

use sqlx::migrate::Migrator;
use std::path::Path;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Highest migration version embedded in this build.
#[must_use]
pub fn latest_schema_version() -> i64 {
    MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0)
}

/// High-level database handle that owns the pool and applies migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (or create) the database at `path`.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = ConnectionPool::new(path).await?;
        Ok(Self { pool })
    }

    /// Open the database and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError` if opening or migrating fails.
    pub async fn open_and_migrate(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::new(path).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Apply every embedded migration this database has not seen yet.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR
            .run(self.pool())
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        tracing::info!("Schema at version {}", latest_schema_version());
        Ok(())
    }

    /// Highest migration version applied to this database, 0 when none are.
    ///
    /// Doubles as a liveness check since it always hits the database.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be queried.
    pub async fn schema_version(&self) -> Result<i64> {
        let tracked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
        )
        .fetch_one(self.pool())
        .await?;
        if !tracked {
            return Ok(0);
        }

        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(self.pool())
                .await?;
        Ok(version.unwrap_or(0))
    }

    /// Get a reference to the underlying connection pool.
    ///
    /// This allows direct access to the `SQLx` pool for the query modules.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
