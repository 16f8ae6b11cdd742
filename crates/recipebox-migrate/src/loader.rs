//! Migration discovery.
//!
//! Reads a directory of `<version>_<name>.<up|down>.sql` files and pairs them
//! into [`Migration`] records ordered by version.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{MigrateError, Result};

/// Suffix every migration file carries.
pub const SQL_SUFFIX: &str = ".sql";

/// Which way a migration script moves the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Forward (`.up.sql`).
    Up,
    /// Reverse (`.down.sql`).
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// The parts of a migration file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Version number.
    pub version: i64,
    /// Descriptive name.
    pub name: String,
    /// Script direction.
    pub direction: Direction,
}

/// A versioned schema change.
///
/// Built by [`load_migrations`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    version: i64,
    name: String,
    forward: String,
    reverse: Option<String>,
}

impl Migration {
    /// Creates a migration with a forward script only.
    #[must_use]
    pub fn new(version: i64, name: impl Into<String>, forward: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            forward: forward.into(),
            reverse: None,
        }
    }

    /// Attaches a reverse script.
    #[must_use]
    pub fn with_reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse = Some(reverse.into());
        self
    }

    /// Returns the version.
    #[must_use]
    pub const fn version(&self) -> i64 {
        self.version
    }

    /// Returns the descriptive name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the forward (up) SQL.
    #[must_use]
    pub fn forward_script(&self) -> &str {
        &self.forward
    }

    /// Returns the reverse (down) SQL, if one was provided.
    #[must_use]
    pub fn reverse_script(&self) -> Option<&str> {
        self.reverse.as_deref()
    }

    /// Returns the `<version>_<name>` identifier.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{:03}_{}", self.version, self.name)
    }
}

/// Parses a migration filename like `001_initial_schema.up.sql`.
///
/// # Errors
///
/// Returns [`MigrateError::InvalidFilename`] if the name does not follow
/// `<version>_<name>.<up|down>.sql`.
pub fn parse_migration_filename(filename: &str) -> Result<MigrationFile> {
    let invalid = |reason: &str| MigrateError::InvalidFilename {
        file: filename.to_string(),
        reason: reason.to_string(),
    };

    let stem = filename
        .strip_suffix(SQL_SUFFIX)
        .ok_or_else(|| invalid("missing .sql extension"))?;

    let (rest, direction) = stem
        .rsplit_once('.')
        .ok_or_else(|| invalid("missing direction"))?;
    let direction = match direction {
        "up" => Direction::Up,
        "down" => Direction::Down,
        other => return Err(invalid(&format!("invalid direction '{other}'"))),
    };

    let (version, name) = rest
        .split_once('_')
        .ok_or_else(|| invalid("expected <version>_<name>"))?;

    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(&format!("invalid version number '{version}'")));
    }
    let version: i64 = version
        .parse()
        .map_err(|_| invalid(&format!("version number '{version}' out of range")))?;

    if name.is_empty() {
        return Err(invalid("missing name"));
    }

    Ok(MigrationFile {
        version,
        name: name.to_string(),
        direction,
    })
}

#[derive(Default)]
struct PendingPair {
    name: Option<String>,
    up: Option<String>,
    down: Option<String>,
}

/// Loads all migrations from `dir`, sorted by ascending version.
///
/// Files that do not end in `.sql` and subdirectories are ignored. A `.sql`
/// file whose name cannot be parsed is skipped with a warning.
///
/// # Errors
///
/// Fails if the directory is missing or unreadable, if a migration file
/// cannot be read, if two files share a version and direction, or if a
/// version has a down script but no up script.
pub fn load_migrations(dir: impl AsRef<Path>) -> Result<Vec<Migration>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(MigrateError::MigrationsDirNotFound(dir.to_path_buf()));
    }

    let mut filenames = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let Some(filename) = entry.file_name().to_str().map(String::from) else {
            warn!(file = ?entry.file_name(), "Skipping migration file with non UTF-8 name");
            continue;
        };
        if filename.ends_with(SQL_SUFFIX) {
            filenames.push(filename);
        }
    }
    // Directory listing order is platform dependent.
    filenames.sort();

    let mut pairs: BTreeMap<i64, PendingPair> = BTreeMap::new();
    for filename in filenames {
        let parsed = match parse_migration_filename(&filename) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(file = %filename, error = %e, "Skipping invalid migration file");
                continue;
            }
        };

        let content = std::fs::read_to_string(dir.join(&filename))?;
        debug!(
            file = %filename,
            version = parsed.version,
            direction = %parsed.direction,
            "Loaded migration script"
        );

        let pair = pairs.entry(parsed.version).or_default();
        let slot = match parsed.direction {
            Direction::Up => &mut pair.up,
            Direction::Down => &mut pair.down,
        };
        if slot.is_some() {
            return Err(MigrateError::DuplicateVersion {
                version: parsed.version,
                file: filename,
            });
        }
        *slot = Some(content);

        match &pair.name {
            None => pair.name = Some(parsed.name),
            Some(existing) if *existing != parsed.name => {
                warn!(
                    version = parsed.version,
                    up_name = %existing,
                    other_name = %parsed.name,
                    "Migration scripts for one version disagree on the name"
                );
                if parsed.direction == Direction::Up {
                    pair.name = Some(parsed.name);
                }
            }
            Some(_) => {}
        }
    }

    let mut migrations = Vec::with_capacity(pairs.len());
    for (version, pair) in pairs {
        let Some(forward) = pair.up else {
            return Err(MigrateError::MissingForwardScript { version });
        };
        migrations.push(Migration {
            version,
            name: pair.name.unwrap_or_default(),
            forward,
            reverse: pair.down,
        });
    }

    Ok(migrations)
}
