//! Bearer token authentication for protected routes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{field, info, instrument};

use crate::auth::jwt::TokenCodec;
use crate::auth::models::{AuthContext, AuthError, TokenStatus};
use crate::config::AuthConfig;
use crate::observability::metrics;
use crate::storage::{DbPool, SqlxTokenRepository, SqlxUserRepository, TokenRepository, UserRepository};

/// Decides whether a request's `Authorization` header identifies a live session.
#[async_trait]
pub trait AuthGuard: Send + Sync {
    async fn authenticate(&self, header: &str) -> Result<AuthContext, AuthError>;
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self { users, tokens, codec }
    }

    pub fn with_sqlx(pool: DbPool, config: &AuthConfig) -> Self {
        Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxTokenRepository::new(pool)),
            Arc::new(TokenCodec::from_config(config)),
        )
    }

    async fn resolve(&self, header: &str) -> Result<AuthContext, AuthError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(AuthError::MissingBearer);
        }

        let token = header.strip_prefix("Bearer ").ok_or(AuthError::MalformedBearer)?.trim();
        let claims = self.codec.decode(token)?;

        let token_id = claims.token_id();
        tracing::Span::current().record("token_id", field::display(&token_id));

        let record = self
            .tokens
            .find_user_token(&claims.user_id(), &token_id)
            .await?
            .ok_or(AuthError::TokenNotFound)?;
        if record.status != TokenStatus::Active {
            return Err(AuthError::InactiveToken);
        }
        if record.expires_at <= Utc::now() {
            return Err(AuthError::ExpiredToken);
        }

        let user = self.users.find_by_id(&record.user_id).await?.ok_or(AuthError::TokenNotFound)?;

        Ok(AuthContext {
            user_id: user.id,
            email: user.email,
            token_id: record.id,
            client_name: record.client_name,
        })
    }
}

#[async_trait]
impl AuthGuard for AuthService {
    #[instrument(skip(self, header), fields(token_id = field::Empty))]
    async fn authenticate(&self, header: &str) -> Result<AuthContext, AuthError> {
        match self.resolve(header).await {
            Ok(context) => {
                metrics::record_authentication("success");
                info!(user_id = %context.user_id, "bearer token authenticated");
                Ok(context)
            }
            Err(err) => {
                metrics::record_authentication(err.metric_status());
                Err(err)
            }
        }
    }
}
