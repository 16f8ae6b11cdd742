//! Error types for the store.

use thiserror::Error;

/// Store-specific errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed during startup.
    #[error("migration error: {0}")]
    Migrate(#[from] recipebox_migrate::error::MigrateError),

    /// No row found matching the query.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Page or page size outside the accepted range.
    #[error("invalid pagination: {0}")]
    InvalidPage(String),

    /// A status string that is not part of the recipe lifecycle.
    #[error("invalid status: {0}. Valid statuses are: processing, review_required, published")]
    InvalidStatus(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
