//! Email/password login and bearer token logout.

use std::sync::Arc;

use argon2::Argon2;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::auth::hashing;
use crate::auth::models::{AccessToken, AuthContext};
use crate::auth::token_service::{IssuedToken, TokenService};
use crate::auth::validation::LoginRequest;
use crate::config::AuthConfig;
use crate::errors::{AuthErrorType, Error, Result};
use crate::observability::metrics;
use crate::storage::{DbPool, SqlxUserRepository, UserRepository};

pub const USER_NOT_FOUND_MESSAGE: &str = "User doesn't exist";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Password mismatch";
pub const LOGOUT_MESSAGE: &str = "You have been successfully logged out!";

#[derive(Clone)]
pub struct LoginService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
    client_name: String,
    /// Verified against when the email is unknown so both failures cost one Argon2 run.
    dummy_hash: Arc<str>,
}

impl LoginService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: TokenService,
        client_name: impl Into<String>,
        hasher: &Argon2<'_>,
    ) -> Result<Self> {
        let dummy_hash = hashing::hash_password(hasher, &uuid::Uuid::new_v4().to_string())?;
        Ok(Self { users, tokens, client_name: client_name.into(), dummy_hash: dummy_hash.into() })
    }

    pub fn with_sqlx(pool: DbPool, config: &AuthConfig) -> Result<Self> {
        let hasher = hashing::password_hasher(config.argon2_memory_kib, config.argon2_iterations)?;
        Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            TokenService::with_sqlx(pool, config),
            config.client_name.clone(),
            &hasher,
        )
    }

    /// Check credentials and issue one access token for the configured client.
    ///
    /// # Errors
    ///
    /// - `Validation` when email or password is empty
    /// - `Auth(UserNotFound)` when no user has exactly this email
    /// - `Auth(PasswordMismatch)` when the password does not verify
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<IssuedToken> {
        if let Err(errors) = request.validate() {
            metrics::record_login("invalid_request");
            return Err(errors.into());
        }

        let Some((user, password_hash)) =
            self.users.find_by_email_with_password(&request.email).await?
        else {
            if let Err(e) = hashing::verify_password(&request.password, &self.dummy_hash) {
                warn!(error = %e, "dummy hash verification failed unexpectedly");
            }
            warn!("login attempt for unknown email");
            metrics::record_login("user_not_found");
            return Err(Error::auth(USER_NOT_FOUND_MESSAGE, AuthErrorType::UserNotFound));
        };

        if !hashing::verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "login attempt with incorrect password");
            metrics::record_login("password_mismatch");
            return Err(Error::auth(PASSWORD_MISMATCH_MESSAGE, AuthErrorType::PasswordMismatch));
        }

        let issued = self.tokens.issue_token(&user, &self.client_name).await?;

        metrics::record_login("success");
        info!(user_id = %user.id, token_id = %issued.token_id, "user logged in");

        Ok(issued)
    }

    /// Revoke the token presented by an authenticated caller.
    ///
    /// The `jti` is revoked in a single statement scoped to `context.user_id`'s own tokens.
    #[instrument(skip(self, context, bearer), fields(user_id = %context.user_id))]
    pub async fn logout(&self, context: &AuthContext, bearer: &str) -> Result<AccessToken> {
        let claims = self.tokens.parse_bearer_token(bearer)?;
        let token_id = claims.token_id();

        let Some(revoked) = self.tokens.revoke_user_token(&context.user_id, &token_id).await?
        else {
            warn!(token_id = %token_id, "logout for a token the caller does not own");
            return Err(Error::auth(
                "Token not found for the authenticated user",
                AuthErrorType::TokenNotFound,
            ));
        };

        info!(token_id = %revoked.id, "user logged out");

        Ok(revoked)
    }
}
