mod models;

pub use models::*;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{error, info, warn};

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Connect to the store and bring the schema up to date.
pub async fn init(url: &str, max_connections: u32) -> Result<DbPool> {
    info!("Initializing database at {}", url);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", url))?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// Like [`init`], but a failed connection does not stop the process.
///
/// The returned pool connects on first use, so the HTTP surface stays up and
/// each request touching storage fails with a database error instead.
/// Only an unparseable connection string is fatal.
pub async fn connect_or_degrade(url: &str, max_connections: u32) -> Result<DbPool> {
    match init(url, max_connections).await {
        Ok(pool) => Ok(pool),
        Err(e) => {
            error!(error = %e, "Could not connect to database");
            warn!("Starting in degraded mode: storage requests will fail until the database is reachable and the service is restarted");
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_lazy(url)
                .with_context(|| format!("Invalid database URL: {}", url))
        }
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: users, products, orders, carts
    let has_users_table: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name='users'")
            .fetch_optional(pool)
            .await?;
    if has_users_table.is_none() {
        execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}
