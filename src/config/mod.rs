//! # Configuration Management
//!
//! Environment-driven configuration for the authgate service. Values are read
//! from the process environment (optionally seeded from a `.env` file by the
//! binary) and validated with `validator` before use.

pub mod settings;

pub use settings::{
    AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig, ServerConfig,
    DEVELOPMENT_JWT_SECRET,
};
