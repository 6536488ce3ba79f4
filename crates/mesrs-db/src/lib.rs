//! # MESRS DB
//!
//! PostgreSQL connection pool and embedded migrations.
//!
//! - `DATABASE_URL`: connection string (required)
//! - `DB_MAX_CONNECTIONS`: pool size (default: 10)
//!
//! ```ignore
//! let pool = mesrs_db::init_db_pool().await?;
//! mesrs_db::run_migrations(&pool).await?;
//! ```

use std::env;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

pub async fn init_db_pool() -> anyhow::Result<PgPool> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let max_connections = env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    connect(&database_url, max_connections).await
}

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(max_connections, "Database pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");
    Ok(())
}
