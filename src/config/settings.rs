//! # Configuration Settings
//!
//! Defines the configuration structure for the authgate service.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use validator::Validate;

/// Secret shipped for local development only. `serve` warns when it is still in use.
pub const DEVELOPMENT_JWT_SECRET: &str = "authgate-development-secret-change-me-before-deploying";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Token and password settings
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Logging and metrics configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load every section from environment variables and validate the result
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.observability.enable_metrics && self.observability.metrics_port == self.server.port
        {
            return Err(Error::validation("Server and metrics ports cannot be the same"));
        }

        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(Error::validation(
                "min_connections cannot be greater than max_connections",
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("AUTHGATE_HOST", defaults.host),
            port: env_or("AUTHGATE_PORT", defaults.port),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Apply embedded migrations when the pool is created
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/authgate.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// A single-connection in-memory database, migrated on creation.
    ///
    /// The connection never idles out, so the database lives as long as the pool.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            idle_timeout_seconds: 0,
            ..Default::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }

    /// Create DatabaseConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_or("DATABASE_URL", defaults.url),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env_or("DATABASE_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_seconds: env_or(
                "DATABASE_CONNECT_TIMEOUT_SECONDS",
                defaults.connect_timeout_seconds,
            ),
            idle_timeout_seconds: env_or(
                "DATABASE_IDLE_TIMEOUT_SECONDS",
                defaults.idle_timeout_seconds,
            ),
            auto_migrate: std::env::var("DATABASE_AUTO_MIGRATE")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.auto_migrate),
        }
    }
}

/// Token signing and password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens
    #[validate(length(min = 32, message = "JWT secret must be at least 32 characters long"))]
    pub jwt_secret: String,

    /// `iss` claim written into and required from every bearer token
    #[validate(length(min = 1, message = "JWT issuer cannot be empty"))]
    pub jwt_issuer: String,

    /// Grant name tokens are issued for; also the `aud` claim
    #[validate(length(min = 1, message = "Client name cannot be empty"))]
    pub client_name: String,

    /// Lifetime of an issued access token in seconds
    #[validate(range(
        min = 60,
        max = 31_536_000,
        message = "Token lifetime must be between 1 minute and 1 year"
    ))]
    pub token_ttl_seconds: u64,

    /// Argon2id memory cost for newly hashed passwords
    #[validate(range(min = 8, message = "Argon2 memory cost must be at least 8 KiB"))]
    pub argon2_memory_kib: u32,

    /// Argon2id iteration count for newly hashed passwords
    #[validate(range(min = 1, message = "Argon2 iterations must be at least 1"))]
    pub argon2_iterations: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            jwt_issuer: "authgate".to_string(),
            client_name: "Password Grant Client".to_string(),
            token_ttl_seconds: 31_536_000,
            argon2_memory_kib: 19_456,
            argon2_iterations: 2,
        }
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }

    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret: env_or("AUTHGATE_JWT_SECRET", defaults.jwt_secret),
            jwt_issuer: env_or("AUTHGATE_JWT_ISSUER", defaults.jwt_issuer),
            client_name: env_or("AUTHGATE_CLIENT_NAME", defaults.client_name),
            token_ttl_seconds: env_or("AUTHGATE_TOKEN_TTL_SECONDS", defaults.token_ttl_seconds),
            argon2_memory_kib: env_or("AUTHGATE_ARGON2_MEMORY_KIB", defaults.argon2_memory_kib),
            argon2_iterations: env_or("AUTHGATE_ARGON2_ITERATIONS", defaults.argon2_iterations),
        }
    }
}

/// Logging and metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to startup logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,

    /// Expose a Prometheus scrape endpoint
    pub enable_metrics: bool,

    /// Prometheus exporter port
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "authgate".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
            enable_metrics: false,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    /// Get metrics bind address (None if disabled)
    pub fn metrics_bind_address(&self) -> Option<String> {
        if !self.enable_metrics || self.metrics_port == 0 {
            None
        } else {
            Some(format!("0.0.0.0:{}", self.metrics_port))
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: env_or("AUTHGATE_SERVICE_NAME", defaults.service_name),
            log_level: env_or("AUTHGATE_LOG_LEVEL", defaults.log_level),
            json_logging: env_flag("AUTHGATE_JSON_LOGGING", defaults.json_logging),
            enable_metrics: env_flag("AUTHGATE_ENABLE_METRICS", defaults.enable_metrics),
            metrics_port: env_or("AUTHGATE_METRICS_PORT", defaults.metrics_port),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|value| value.parse::<T>().ok()).unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}
