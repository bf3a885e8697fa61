/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use cofound_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use cofound_shared::auth::middleware::create_jwt_middleware;
use sqlx::PgPool;
use std::{future::Future, sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the router with every route and the middleware stack
///
/// ```text
/// /
/// ├── GET /health
/// └── /api
///     ├── /auth
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   └── GET|PUT /profile                 (auth)
///     └── /startups
///         ├── GET /                            (public)
///         ├── POST /                           (auth)
///         ├── GET /my/startups                 (auth)
///         ├── GET /:id                         (public)
///         ├── PUT|DELETE /:id                  (owner)
///         ├── POST /:id/cofounders             (owner)
///         └── DELETE /:id/cofounders/:user_id  (owner)
/// ```
///
/// Authentication is a `route_layer` on the protected routers only, so
/// public and protected methods can share a path. Ownership is checked in
/// the handlers.
pub fn build_router(state: AppState) -> Router {
    let auth_layer = middleware::from_fn(create_jwt_middleware(state.jwt_secret().to_owned()));

    let public_auth = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let protected_auth = Router::new()
        .route(
            "/profile",
            get(routes::auth::get_profile).put(routes::auth::update_profile),
        )
        .route_layer(auth_layer.clone());

    let public_startups = Router::new()
        .route("/", get(routes::startups::list_startups))
        .route("/:id", get(routes::startups::get_startup));

    let protected_startups = Router::new()
        .route("/", post(routes::startups::create_startup))
        .route("/my/startups", get(routes::startups::my_startups))
        .route(
            "/:id",
            put(routes::startups::update_startup).delete(routes::startups::delete_startup),
        )
        .route("/:id/cofounders", post(routes::startups::add_cofounder))
        .route(
            "/:id/cofounders/:user_id",
            delete(routes::startups::remove_cofounder),
        )
        .route_layer(auth_layer);

    let api_routes = Router::new()
        .nest("/auth", public_auth.merge(protected_auth))
        .nest("/startups", public_startups.merge(protected_startups));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it
///
/// The SIGTERM handler is installed when this is called, not when the
/// future is first polled, so a container stop arriving during startup
/// still triggers a graceful shutdown.
pub fn shutdown_signal() -> impl Future<Output = ()> {
    #[cfg(unix)]
    let terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate());

    async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            match terminate {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, draining connections..."),
            _ = terminate => tracing::info!("Received SIGTERM, draining connections..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() {
        let shutdown = shutdown_signal();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .expect("Failed to run kill");
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), shutdown)
            .await
            .expect("SIGTERM should resolve the shutdown future");
    }
}
