//! Database connection settings and pool construction.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Connection;
use tracing::info;

use crate::error::{Result, StoreError};

/// Environment variable holding the database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable overriding the pool size.
pub const MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";

/// Connection pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database URL, e.g. `sqlite:recipebox.db?mode=rwc`.
    pub url: String,
    /// Maximum number of open connections.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// Maximum lifetime of a pooled connection.
    pub max_lifetime: Duration,
    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from("sqlite:recipebox.db?mode=rwc"),
            max_connections: 25,
            min_connections: 0,
            max_lifetime: Duration::from_secs(5 * 60),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl DatabaseConfig {
    /// Creates a config for `url` with default pool settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Reads the config from the process environment.
    ///
    /// `DATABASE_URL` is required; `DATABASE_MAX_CONNECTIONS` is optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the config through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(DATABASE_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                StoreError::Config(format!("{DATABASE_URL_ENV} environment variable is required"))
            })?;

        let mut config = Self::new(url);
        if let Some(raw) = lookup(MAX_CONNECTIONS_ENV) {
            config.max_connections = raw
                .trim()
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    StoreError::Config(format!(
                        "{MAX_CONNECTIONS_ENV} must be a positive integer, got '{raw}'"
                    ))
                })?;
        }
        Ok(config)
    }

    /// Opens a pool and checks that the database answers.
    pub async fn connect(&self) -> Result<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .max_lifetime(Some(self.max_lifetime))
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.url)
            .await?;

        pool.acquire().await?.ping().await?;

        info!(max_connections = self.max_connections, "Database connection established");
        Ok(pool)
    }

    /// Opens a pool and applies pending migrations from `migrations_dir`.
    ///
    /// The pool is only returned once the schema is fully migrated.
    pub async fn connect_and_migrate(&self, migrations_dir: impl AsRef<Path>) -> Result<SqlitePool> {
        let pool = self.connect().await?;
        recipebox_migrate::run_migrations(&pool, migrations_dir).await?;
        Ok(pool)
    }
}
