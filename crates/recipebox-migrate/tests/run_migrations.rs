//! End-to-end runs of the migration engine against SQLite.

use std::path::{Path, PathBuf};

use recipebox_migrate::prelude::*;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;

async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

fn write(dir: &Path, name: &str, sql: &str) {
    std::fs::write(dir.join(name), sql).unwrap();
}

async fn applied(pool: &SqlitePool) -> Vec<i64> {
    MigrationHistory::new(pool.clone())
        .applied_versions()
        .await
        .unwrap()
        .into_iter()
        .collect()
}

async fn columns(pool: &SqlitePool, table: &str) -> Vec<String> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(pool)
        .await
        .unwrap();
    rows.into_iter().map(|(name,)| name).collect()
}

#[tokio::test]
async fn init_then_add_column_scenario() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.up.sql", "CREATE TABLE t (id INTEGER PRIMARY KEY);");
    write(dir.path(), "002_add_col.up.sql", "ALTER TABLE t ADD COLUMN label TEXT;");
    let pool = memory_pool().await;

    let first = run_migrations(&pool, dir.path()).await.unwrap();
    assert_eq!(first.applied, vec![1, 2]);
    assert_eq!(columns(&pool, "t").await, vec!["id", "label"]);
    assert_eq!(applied(&pool).await, vec![1, 2]);

    let second = run_migrations(&pool, dir.path()).await.unwrap();
    assert!(second.is_noop());
    assert_eq!(second.skipped, vec![1, 2]);
    assert_eq!(applied(&pool).await, vec![1, 2]);
}

#[tokio::test]
async fn application_order_ignores_creation_order() {
    let dir = TempDir::new().unwrap();
    // Each script records its own version, so the log shows execution order.
    write(
        dir.path(),
        "003_x.up.sql",
        "INSERT INTO run_log (version) VALUES (3);",
    );
    write(
        dir.path(),
        "001_y.up.sql",
        "CREATE TABLE run_log (seq INTEGER PRIMARY KEY AUTOINCREMENT, version INTEGER); \
         INSERT INTO run_log (version) VALUES (1);",
    );
    write(
        dir.path(),
        "002_z.up.sql",
        "INSERT INTO run_log (version) VALUES (2);",
    );
    let pool = memory_pool().await;

    let report = run_migrations(&pool, dir.path()).await.unwrap();
    assert_eq!(report.applied, vec![1, 2, 3]);

    let order: Vec<(i64,)> = sqlx::query_as("SELECT version FROM run_log ORDER BY seq")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(order, vec![(1,), (2,), (3,)]);
}

#[tokio::test]
async fn new_versions_are_picked_up_on_later_runs() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.up.sql", "CREATE TABLE t (id INTEGER PRIMARY KEY);");
    let pool = memory_pool().await;
    run_migrations(&pool, dir.path()).await.unwrap();

    write(dir.path(), "005_gap.up.sql", "ALTER TABLE t ADD COLUMN g TEXT;");
    let report = run_migrations(&pool, dir.path()).await.unwrap();
    assert_eq!(report.applied, vec![5]);
    assert_eq!(report.skipped, vec![1]);
    assert_eq!(applied(&pool).await, vec![1, 5]);
}

#[tokio::test]
async fn failed_migration_aborts_and_leaves_no_trace() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.up.sql", "CREATE TABLE t (id INTEGER PRIMARY KEY);");
    write(
        dir.path(),
        "002_half.up.sql",
        "CREATE TABLE half_done (id INTEGER); INSERT INTO no_such_table VALUES (1);",
    );
    write(dir.path(), "003_after.up.sql", "CREATE TABLE after_failure (id INTEGER);");
    let pool = memory_pool().await;

    let err = run_migrations(&pool, dir.path()).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::MigrationFailed { version: 2, ref name, .. } if name == "half"
    ));

    assert_eq!(applied(&pool).await, vec![1]);
    assert!(columns(&pool, "half_done").await.is_empty());
    assert!(columns(&pool, "after_failure").await.is_empty());
}

#[tokio::test]
async fn structural_load_errors_touch_nothing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "001_init.up.sql", "CREATE TABLE t (id INTEGER PRIMARY KEY);");
    write(dir.path(), "002_only_down.down.sql", "DROP TABLE t;");
    let pool = memory_pool().await;

    let err = run_migrations(&pool, dir.path()).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::MissingForwardScript { version: 2 }
    ));
    assert!(columns(&pool, "t").await.is_empty());
}

#[tokio::test]
async fn missing_directory_is_fatal() {
    let pool = memory_pool().await;
    let err = run_migrations(&pool, "/definitely/not/here").await.unwrap_err();
    assert!(matches!(err, MigrateError::MigrationsDirNotFound(_)));
}

#[tokio::test]
async fn repository_migrations_apply_cleanly() {
    let dir: PathBuf = [env!("CARGO_MANIFEST_DIR"), "..", "..", "migrations"]
        .iter()
        .collect();
    let migrations = load_migrations(&dir).unwrap();
    assert!(!migrations.is_empty());
    assert!(migrations.iter().all(|m| m.reverse_script().is_some()));

    let pool = memory_pool().await;
    let report = run_migrations(&pool, &dir).await.unwrap();
    assert_eq!(report.applied.len(), migrations.len());
    assert!(columns(&pool, "recipes").await.contains(&String::from("status")));
}
