//! # authgate
//!
//! A small authentication service: `POST /login` exchanges an email and
//! password for a bearer access token, `GET /logout` revokes the token it is
//! called with.
//!
//! ```text
//! HTTP (axum) → auth guard → LoginService / TokenService → SQLite (sqlx)
//! ```
//!
//! Users are added by operators through the `authgate user create` command.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
