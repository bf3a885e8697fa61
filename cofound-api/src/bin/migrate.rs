//! # Cofound Migration Tool
//!
//! Creates the database if it is missing, applies pending migrations and
//! prints the resulting status.
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/cofound cargo run -p cofound-api --bin cofound-migrate
//! DATABASE_URL=postgresql://localhost/cofound cargo run -p cofound-api --bin cofound-migrate -- --status
//! ```

use anyhow::Context;
use cofound_shared::db::{
    migrations::{ensure_database_exists, get_migration_status, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cofound_shared=info".into()),
        )
        .init();

    let status_only = env::args().skip(1).any(|arg| arg == "--status");
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

    if !status_only {
        ensure_database_exists(&database_url)
            .await
            .context("Failed to create database")?;
    }

    let pool = create_pool(DatabaseConfig {
        max_connections: 1,
        min_connections: 0,
        ..DatabaseConfig::from_url(database_url)
    })
    .await
    .context("Failed to connect to database")?;

    if !status_only {
        run_migrations(&pool).await.context("Failed to run migrations")?;
    }

    let status = get_migration_status(&pool).await?;
    tracing::info!(
        applied = status.applied_migrations,
        known = status.known_migrations,
        latest = ?status.latest_version,
        up_to_date = status.is_up_to_date(),
        "Migration status"
    );

    close_pool(pool).await;

    if !status.is_up_to_date() {
        anyhow::bail!(
            "{} of {} migrations applied",
            status.applied_migrations,
            status.known_migrations
        );
    }

    Ok(())
}
