//! # Cofound API Server
//!
//! Serves the startup directory, team management and account endpoints.
//! Migrations run at startup, so a fresh database only needs to exist.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/cofound JWT_SECRET=... cargo run -p cofound-api
//! ```

use cofound_api::{
    app::{build_router, shutdown_signal, AppState},
    config::Config,
};
use cofound_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cofound_api=debug,cofound_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Cofound API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(DatabaseConfig {
        max_connections: config.database.max_connections,
        ..DatabaseConfig::from_url(config.database.url.clone())
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}
