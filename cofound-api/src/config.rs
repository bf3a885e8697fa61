/// Configuration for the API server
///
/// Loaded from environment variables, with a `.env` file picked up in
/// development.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 5000)
/// - `JWT_SECRET`: token signing key, at least 32 characters (required)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: *)
/// - `APP_ENV`: `production` turns on HSTS (default: development)
/// - `RUST_LOG`: log filter (default: info)
///
/// # Example
///
/// ```no_run
/// use cofound_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Shortest accepted `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; a `*` entry allows any origin
    pub cors_origins: Vec<String>,

    /// Production mode (adds Strict-Transport-Security)
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing key
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Fails if a required variable is missing, a number doesn't parse, or
    /// `JWT_SECRET` is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var_or("API_HOST", "0.0.0.0");
        let port = var_or("API_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;

        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let production = var_or("APP_ENV", "development").eq_ignore_ascii_case("production");

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is not a number: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_JWT_SECRET_LENGTH);
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/cofound"), ("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert!(config.allows_any_origin());
        assert!(!config.api.production);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/cofound"),
            ("JWT_SECRET", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
            ("CORS_ORIGINS", "https://cofound.app, https://admin.cofound.app"),
            ("APP_ENV", "Production"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(
            config.api.cors_origins,
            vec!["https://cofound.app", "https://admin.cofound.app"]
        );
        assert!(!config.allows_any_origin());
        assert!(config.api.production);
    }

    #[test]
    fn test_required_variables() {
        let err = load(&[("JWT_SECRET", SECRET)]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = load(&[("DATABASE_URL", "postgresql://localhost/cofound")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_rejects_short_secret_and_bad_port() {
        let err = load(&[("DATABASE_URL", "postgresql://x"), ("JWT_SECRET", "short")]).unwrap_err();
        assert!(err.to_string().contains("at least 32"));

        let err = load(&[
            ("DATABASE_URL", "postgresql://x"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let config = load(&[("DATABASE_URL", "postgresql://x"), ("JWT_SECRET", SECRET)]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET));
    }
}
