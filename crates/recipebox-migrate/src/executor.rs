//! Migration executor.
//!
//! Applies pending migrations in ascending version order. Each migration's
//! forward script and its bookkeeping row are committed in one transaction,
//! and the first failure stops the run.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, error, info};

use crate::error::{MigrateError, Result};
use crate::history::MigrationHistory;
use crate::loader::Migration;

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Versions applied by this run (or that would be, in dry-run mode).
    pub applied: Vec<i64>,
    /// Versions that were already applied.
    pub skipped: Vec<i64>,
    /// Whether nothing was executed.
    pub dry_run: bool,
}

impl MigrationReport {
    /// Returns true if the run changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Executes migrations against a database.
///
/// Assumes a single writer. Two instances racing on the same database are
/// only kept from double-applying a version by the primary key of the
/// bookkeeping table; the loser's step fails and its run aborts.
pub struct MigrationExecutor {
    pool: SqlitePool,
    history: MigrationHistory,
    dry_run: bool,
}

impl MigrationExecutor {
    /// Creates a new migration executor.
    pub fn new(pool: SqlitePool) -> Self {
        let history = MigrationHistory::new(pool.clone());
        Self {
            pool,
            history,
            dry_run: false,
        }
    }

    /// Enables dry-run mode (SQL is logged but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Ensures the migrations history table exists.
    pub async fn init(&self) -> Result<()> {
        if !self.dry_run {
            self.history.ensure_table().await?;
        }
        Ok(())
    }

    /// Returns the migration history.
    #[must_use]
    pub fn history(&self) -> &MigrationHistory {
        &self.history
    }

    /// Returns pending migrations (not yet applied), lowest version first.
    pub async fn pending<'a>(&self, migrations: &'a [Migration]) -> Result<Vec<&'a Migration>> {
        let applied = if self.history.table_exists().await? {
            self.history.applied_versions().await?
        } else {
            Default::default()
        };

        let mut pending: Vec<&Migration> = migrations
            .iter()
            .filter(|m| !applied.contains(&m.version()))
            .collect();
        pending.sort_by_key(|m| m.version());
        Ok(pending)
    }

    /// Applies a single migration in its own transaction.
    ///
    /// Does not consult the history first: applying an already recorded
    /// version fails on the bookkeeping insert and is rolled back.
    pub async fn apply(&self, migration: &Migration) -> Result<()> {
        info!(
            version = migration.version(),
            name = %migration.name(),
            "Applying migration"
        );
        debug!(sql = %migration.forward_script(), "Executing SQL");

        if self.dry_run {
            return Ok(());
        }

        let failed = |source: sqlx::Error| MigrateError::MigrationFailed {
            version: migration.version(),
            name: migration.name().to_string(),
            source,
        };

        // Dropping `tx` on an early return rolls it back.
        let mut tx = self.pool.begin().await.map_err(failed)?;

        sqlx::raw_sql(migration.forward_script())
            .execute(&mut *tx)
            .await
            .map_err(failed)?;

        self.history
            .record_applied(&mut tx, migration.version())
            .await
            .map_err(failed)?;

        tx.commit().await.map_err(failed)?;

        info!(
            version = migration.version(),
            name = %migration.name(),
            "Migration applied successfully"
        );

        Ok(())
    }

    /// Applies every pending migration in ascending version order.
    ///
    /// Stops at the first failure; later versions are not attempted.
    pub async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport> {
        let pending = self.pending(migrations).await?;

        let mut report = MigrationReport {
            dry_run: self.dry_run,
            ..MigrationReport::default()
        };
        let mut skipped: Vec<i64> = migrations
            .iter()
            .map(Migration::version)
            .filter(|v| !pending.iter().any(|m| m.version() == *v))
            .collect();
        skipped.sort_unstable();
        for version in &skipped {
            debug!(version, "Migration already applied, skipping");
        }
        report.skipped = skipped;

        for migration in pending {
            if let Err(e) = self.apply(migration).await {
                error!(
                    version = migration.version(),
                    name = %migration.name(),
                    error = %e,
                    "Migration failed, aborting run"
                );
                return Err(e);
            }
            report.applied.push(migration.version());
        }

        if report.is_noop() {
            info!("Database schema is up to date");
        } else {
            info!(count = report.applied.len(), "Migrations complete");
        }

        Ok(report)
    }

    /// Returns the forward SQL for a migration without executing it.
    #[must_use]
    pub fn sql_for<'a>(&self, migration: &'a Migration) -> &'a str {
        migration.forward_script()
    }

    /// Returns the rollback SQL for a migration, if it has any.
    ///
    /// Reverse scripts are never executed by the executor.
    #[must_use]
    pub fn rollback_sql_for<'a>(&self, migration: &'a Migration) -> Option<&'a str> {
        migration.reverse_script()
    }
}
