/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "pool": { "active_connections": 1, "idle_connections": 2, "total_connections": 3 }
/// }
/// ```
///
/// Always 200; a failed database probe reports `"degraded"` instead.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use cofound_shared::db::pool::{get_pool_stats, health_check as probe_database, PoolStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: &'static str,

    pub version: &'static str,

    /// `connected` or `disconnected`
    pub database: &'static str,

    pub pool: PoolStats,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match probe_database(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health probe failed");
            false
        }
    };

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        pool: get_pool_stats(&state.db),
    }))
}
