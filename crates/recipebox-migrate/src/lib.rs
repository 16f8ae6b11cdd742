//! File-based, forward-only database migrations.
//!
//! `recipebox-migrate` evolves a database schema from a directory of plain
//! SQL scripts:
//! - Scripts are named `<version>_<name>.up.sql`, with an optional
//!   `<version>_<name>.down.sql`
//! - Pending versions are applied in ascending order, each in its own
//!   transaction together with its bookkeeping row
//! - Re-running against an up-to-date database changes nothing
//!
//! # Architecture
//!
//! - **Loader** - Parses file names and pairs up/down scripts
//! - **History** - The `schema_migrations` bookkeeping table
//! - **Executor** - Applies pending migrations, stopping at the first failure
//!
//! Down scripts are loaded and can be previewed, but are never executed.
//!
//! # Example
//!
//! ```rust,ignore
//! use recipebox_migrate::run_migrations;
//!
//! let report = run_migrations(&pool, "migrations").await?;
//! println!("applied {:?}", report.applied);
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply pending migrations
//! recipebox-migrate migrate
//!
//! # Show migration status
//! recipebox-migrate show-migrations
//!
//! # Print the down script of version 3
//! recipebox-migrate sql-migrate 3 --reverse
//! ```

use std::path::Path;

use sqlx::sqlite::SqlitePool;
use tracing::info;

pub mod error;
pub mod executor;
pub mod history;
pub mod loader;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{MigrateError, Result};
    pub use crate::executor::{MigrationExecutor, MigrationReport};
    pub use crate::history::{AppliedMigration, MigrationHistory};
    pub use crate::loader::{load_migrations, parse_migration_filename, Direction, Migration};
    pub use crate::run_migrations;
}

/// Loads migrations from `dir` and applies every pending one.
///
/// Must complete before any schema-dependent query runs. Any error is meant
/// to abort startup.
///
/// # Errors
///
/// Returns a load error for an unreadable directory or an incomplete
/// version, and [`error::MigrateError::MigrationFailed`] for the first
/// migration that could not be applied.
pub async fn run_migrations(
    pool: &SqlitePool,
    dir: impl AsRef<Path>,
) -> error::Result<executor::MigrationReport> {
    let dir = dir.as_ref();
    info!(dir = %dir.display(), "Running migrations");

    let migrations = loader::load_migrations(dir)?;
    let executor = executor::MigrationExecutor::new(pool.clone());
    executor.init().await?;
    executor.run(&migrations).await
}
