//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
///
/// Built once at startup and handed to every component that needs it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token signing configuration.
    pub auth: AuthConfig,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Rate limit configuration.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development; error bodies carry debug detail.
    #[default]
    Development,
    /// Production; secure cookies and no debug detail.
    Production,
    /// Test runs.
    Test,
}

impl Environment {
    /// Whether this is a production deployment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Token signing configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins, comma separated. `*` allows any origin.
    #[serde(default = "default_cors_origin")]
    pub origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: default_cors_origin(),
        }
    }
}

/// Rate limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Window length in seconds.
    #[serde(default = "default_rate_window")]
    pub window_secs: u64,
    /// Maximum requests per key per window.
    #[serde(default = "default_rate_max")]
    pub max_requests: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: default_rate_window(),
            max_requests: default_rate_max(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_token_ttl() -> u64 {
    // 7 days
    7 * 24 * 60 * 60
}

fn default_cors_origin() -> String {
    "*".to_string()
}

const fn default_rate_window() -> u64 {
    900
}

const fn default_rate_max() -> u32 {
    100
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `DEVLINK_ENV`)
    /// 4. Environment variables with `DEVLINK__` prefix, e.g. `DEVLINK__AUTH__JWT_SECRET`
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("DEVLINK_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .set_default("server.environment", env.as_str())?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DEVLINK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("DEVLINK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration suitable for tests: in-memory friendly, short-lived tokens.
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: Environment::Test,
                request_timeout_secs: default_request_timeout(),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-do-not-use".to_string(),
                token_ttl_secs: 3600,
            },
            cors: CorsConfig::default(),
            rate_limit: RateLimitSettings {
                window_secs: 60,
                max_requests: 10_000,
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let raw = r#"{
            "server": {},
            "database": { "url": "postgres://localhost/devlink" },
            "auth": { "jwt_secret": "s3cret" }
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.auth.token_ttl_secs, 604_800);
        assert_eq!(config.cors.origin, "*");
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let config = Config::for_tests();
        let rendered = format!("{:?}", config.auth);
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_environment_is_production() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Test.is_production());
    }
}
