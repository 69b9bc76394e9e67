//! # Structured Logging
//!
//! Subscriber setup plus span helpers for the tracing ecosystem.
//!
//! `RUST_LOG` wins over the configured level when it is set, so operators can
//! raise verbosity for a single module without touching the service config.

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Create a tracing span for database operations.
///
/// ```rust,ignore
/// let span = db_span!("users.find_by_email");
/// let span = db_span!("access_tokens.revoke", token_id = %id);
/// ```
#[macro_export]
macro_rules! db_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber (plain text or JSON).
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config_with_source("Invalid log level", Box::new(e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| Error::config_with_source("Failed to install tracing subscriber", e.into()))
}

/// Log configuration at startup. Secrets are never included.
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        database_in_memory = config.database.is_in_memory(),
        auto_migrate = config.database.auto_migrate,
        client_name = %config.auth.client_name,
        jwt_issuer = %config.auth.jwt_issuer,
        token_ttl_seconds = config.auth.token_ttl_seconds,
        metrics_enabled = config.observability.enable_metrics,
        "authgate configuration"
    );
}
