//! Migration history tracking.
//!
//! This module manages the `schema_migrations` table that records which
//! migration versions have been applied. The table is append-only: rows are
//! inserted by the executor, inside the same transaction as the migration
//! they describe, and are never updated or deleted.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnection, SqlitePool};

use crate::error::{MigrateError, Result};

/// Name of the bookkeeping table.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

/// SQL to create the migrations history table (SQLite).
pub const CREATE_MIGRATIONS_TABLE_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// A record of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    /// Migration version.
    pub version: i64,
    /// When the migration was applied.
    pub applied_at: DateTime<Utc>,
}

/// Reads and appends to the migration history.
#[derive(Debug, Clone)]
pub struct MigrationHistory {
    pool: SqlitePool,
}

impl MigrationHistory {
    /// Creates a new migration history manager.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ensures the migrations table exists.
    pub async fn ensure_table(&self) -> Result<()> {
        sqlx::query(CREATE_MIGRATIONS_TABLE_SQL)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns whether the migrations table exists yet.
    pub async fn table_exists(&self) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(MIGRATIONS_TABLE)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Records a migration version as applied.
    ///
    /// Runs on the caller's connection so the insert can share a
    /// transaction with the migration script. Fails on a duplicate version.
    pub async fn record_applied(
        &self,
        conn: &mut SqliteConnection,
        version: i64,
    ) -> std::result::Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO schema_migrations (version) VALUES (?)")
            .bind(version)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Checks if a version has been applied.
    pub async fn is_applied(&self, version: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM schema_migrations WHERE version = ?")
            .bind(version)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Gets the set of applied versions.
    pub async fn applied_versions(&self) -> Result<BTreeSet<i64>> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT version FROM schema_migrations")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(version,)| version).collect())
    }

    /// Gets all applied migrations, oldest version first.
    pub async fn get_applied(&self) -> Result<Vec<AppliedMigration>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT version, applied_at FROM schema_migrations ORDER BY version")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(version, applied_at)| {
                Ok(AppliedMigration {
                    version,
                    applied_at: parse_applied_at(&applied_at)?,
                })
            })
            .collect()
    }

    /// Gets the highest applied version.
    pub async fn current_version(&self) -> Result<Option<i64>> {
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(version) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Counts applied migrations.
    pub async fn count_applied(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

/// Parses an `applied_at` value written by SQLite's `datetime('now')` or as
/// RFC 3339.
fn parse_applied_at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|e| MigrateError::InvalidState(format!("bad applied_at '{raw}': {e}")))
}
