//! recipebox-migrate CLI
//!
//! Command-line tool for managing database migrations.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use recipebox_migrate::prelude::*;

/// Forward-only SQL migrations for the recipebox database.
#[derive(Parser)]
#[command(name = "recipebox-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:recipebox.db?mode=rwc")]
    database: String,

    /// Migrations directory.
    #[arg(short, long, env = "MIGRATIONS_DIR", default_value = "migrations")]
    migrations_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations.
    Migrate {
        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Show migration status.
    ShowMigrations {
        /// Print the status as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show SQL for a migration without executing.
    SqlMigrate {
        /// Migration version.
        #[arg(value_name = "VERSION")]
        target: i64,

        /// Show rollback SQL instead of forward SQL.
        #[arg(short, long)]
        reverse: bool,
    },

    /// Initialize the migrations system (create history table).
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init => {
            let executor = connect(&cli.database).await?;
            info!("Initializing migrations system...");
            executor.init().await?;
            info!("Migrations table created successfully.");
        }

        Commands::Migrate { dry_run } => {
            let migrations = load_migrations(&cli.migrations_dir)?;
            let executor = connect(&cli.database).await?.dry_run(dry_run);
            executor.init().await?;

            if dry_run {
                info!("Dry run mode - SQL will be logged but not executed.");
            }

            let report = executor.run(&migrations).await?;
            info!(
                applied = ?report.applied,
                skipped = report.skipped.len(),
                "Migrations completed successfully"
            );
        }

        Commands::ShowMigrations { json } => {
            let migrations = load_migrations(&cli.migrations_dir)?;
            let executor = connect(&cli.database).await?;
            executor.init().await?;
            let applied = executor.history().get_applied().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&applied)?);
                return Ok(());
            }

            println!("\nMigrations:");
            println!("{:-<60}", "");
            for migration in &migrations {
                match applied.iter().find(|a| a.version == migration.version()) {
                    Some(entry) => println!(
                        " [X] {} ({})",
                        migration.id(),
                        entry.applied_at.format("%Y-%m-%d %H:%M:%S")
                    ),
                    None => println!(" [ ] {}", migration.id()),
                }
            }
            for entry in &applied {
                if !migrations.iter().any(|m| m.version() == entry.version) {
                    println!(" [?] {:03} (applied, no file)", entry.version);
                }
            }
            println!();
        }

        Commands::SqlMigrate { target, reverse } => {
            let migrations = load_migrations(&cli.migrations_dir)?;
            let migration = migrations
                .iter()
                .find(|m| m.version() == target)
                .ok_or(MigrateError::MigrationNotFound(target))?;
            let sql = if reverse {
                migration
                    .reverse_script()
                    .with_context(|| format!("migration {} has no down script", migration.id()))?
            } else {
                migration.forward_script()
            };
            println!("{sql}");
        }
    }

    Ok(())
}

/// Opens the database and wraps it in an executor.
async fn connect(database: &str) -> anyhow::Result<MigrationExecutor> {
    // Migrations assume a single writer.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database)
        .await
        .with_context(|| format!("failed to connect to {database}"))?;
    Ok(MigrationExecutor::new(pool))
}
