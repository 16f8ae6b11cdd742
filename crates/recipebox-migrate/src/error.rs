//! Error types for the migration system.

use std::path::PathBuf;

/// Errors that can occur during migration operations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Database error outside of a migration step (bookkeeping setup, reads).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No migrations directory found.
    #[error("Migrations directory not found: {0}")]
    MigrationsDirNotFound(PathBuf),

    /// A file name does not follow `<version>_<name>.<up|down>.sql`.
    #[error("Invalid migration filename '{file}': {reason}")]
    InvalidFilename {
        /// The offending file name.
        file: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A version has a down script but no up script.
    #[error("Missing up migration for version {version}")]
    MissingForwardScript {
        /// The incomplete version.
        version: i64,
    },

    /// Two scripts claim the same version and direction.
    #[error("Duplicate migration for version {version}: {file}")]
    DuplicateVersion {
        /// The duplicated version.
        version: i64,
        /// The second file found for it.
        file: String,
    },

    /// A migration step failed and was rolled back.
    #[error("Failed to apply migration {version}_{name}: {source}")]
    MigrationFailed {
        /// Version of the failed migration.
        version: i64,
        /// Name of the failed migration.
        name: String,
        /// The underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// Migration not found.
    #[error("Migration not found: {0}")]
    MigrationNotFound(i64),

    /// Invalid migration state.
    #[error("Invalid migration state: {0}")]
    InvalidState(String),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
