/// PostgreSQL connection pool lifecycle
///
/// The pool is built once at process start, handed to every data-access call
/// explicitly (there is no global pool), and closed on shutdown.
///
/// # Example
///
/// ```no_run
/// use cofound_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let pool = create_pool(DatabaseConfig::from_url("postgresql://localhost/cofound")).await?;
///
/// let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM startups")
///     .fetch_one(&pool)
///     .await?;
///
/// close_pool(pool).await;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection pool settings
///
/// Timeouts are in seconds so they can be read straight from environment
/// variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Connections kept warm while idle
    pub min_connections: u32,

    /// How long a query waits for a free connection before failing
    pub acquire_timeout_seconds: u64,

    /// Idle connections are closed after this long (None = never)
    pub idle_timeout_seconds: Option<u64>,

    /// Connections are recycled after this long (None = never)
    pub max_lifetime_seconds: Option<u64>,

    /// Ping connections before handing them out
    pub test_before_acquire: bool,
}

impl DatabaseConfig {
    /// Default settings pointed at `url`
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
            test_before_acquire: true,
        }
    }
}

/// Opens the pool and verifies the database answers
///
/// # Errors
///
/// Returns an error if the URL is invalid, the server is unreachable, or the
/// health check query fails.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_seconds = config.acquire_timeout_seconds,
        "Creating database connection pool"
    );

    let mut pool_options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .test_before_acquire(config.test_before_acquire);

    if let Some(idle_timeout) = config.idle_timeout_seconds {
        pool_options = pool_options.idle_timeout(Duration::from_secs(idle_timeout));
        debug!(idle_timeout_seconds = idle_timeout, "Set idle timeout");
    }

    if let Some(max_lifetime) = config.max_lifetime_seconds {
        pool_options = pool_options.max_lifetime(Duration::from_secs(max_lifetime));
        debug!(max_lifetime_seconds = max_lifetime, "Set max lifetime");
    }

    let pool = pool_options.connect(&config.url).await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Runs `SELECT 1` against the pool
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Snapshot of pool usage, reported by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    /// Connections currently checked out
    pub active_connections: usize,

    /// Connections sitting idle
    pub idle_connections: usize,

    /// All open connections
    pub total_connections: usize,
}

pub fn get_pool_stats(pool: &PgPool) -> PoolStats {
    let size = pool.size();
    let idle = pool.num_idle() as u32;

    PoolStats {
        active_connections: size.saturating_sub(idle) as usize,
        idle_connections: idle as usize,
        total_connections: size as usize,
    }
}

/// Closes every connection; call once during shutdown
pub async fn close_pool(pool: PgPool) {
    info!("Closing database connection pool");
    pool.close().await;
    info!("Database connection pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout_seconds, 30);
        assert_eq!(config.idle_timeout_seconds, Some(600));
        assert_eq!(config.max_lifetime_seconds, Some(1800));
        assert!(config.test_before_acquire);
    }

    #[test]
    fn test_database_config_from_url() {
        let config = DatabaseConfig::from_url("postgresql://localhost/cofound");
        assert_eq!(config.url, "postgresql://localhost/cofound");
        assert_eq!(config.max_connections, 10);
    }

    #[tokio::test]
    async fn test_pool_stats_on_lazy_pool() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/cofound")
            .expect("lazy pool should build without connecting");

        let stats = get_pool_stats(&pool);
        assert_eq!(stats.total_connections, 0);
        assert_eq!(stats.active_connections, 0);
    }
}
