//! Repositories for the user directory and the access-token store.

pub mod token;
pub mod user;

pub use token::{SqlxTokenRepository, TokenRepository};
pub use user::{SqlxUserRepository, UserRepository};
