pub mod auth;
pub mod health;

pub use auth::{login_handler, logout_handler, LoginPayload, LoginResponse};
pub use health::{health_handler, HealthResponse};
