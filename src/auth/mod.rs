//! # Authentication
//!
//! Password login, bearer token issuance and the guard that protects private
//! routes. Tokens are HS256 JWTs whose `jti` refers to a stored access token
//! record; revoking the record ends the session.

pub mod auth_service;
pub mod hashing;
pub mod jwt;
pub mod login_service;
pub mod middleware;
pub mod models;
pub mod token_service;
pub mod user;
pub mod user_service;
pub mod validation;

pub use auth_service::{AuthGuard, AuthService};
pub use jwt::{AccessClaims, TokenCodec};
pub use login_service::LoginService;
pub use models::{AccessToken, AuthContext, AuthError, TokenStatus};
pub use token_service::{IssuedToken, TokenService};
pub use user::User;
pub use user_service::UserService;
pub use validation::{CreateUserRequest, LoginRequest};
