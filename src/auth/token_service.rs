//! Issuing, looking up and revoking access tokens.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::auth::jwt::{AccessClaims, TokenCodec};
use crate::auth::models::{AccessToken, NewAccessToken};
use crate::auth::user::User;
use crate::config::AuthConfig;
use crate::domain::{TokenId, UserId};
use crate::errors::{AuthErrorType, Error, Result};
use crate::observability::metrics;
use crate::storage::{DbPool, SqlxTokenRepository, TokenRepository};

/// A freshly minted bearer token. `access_token` is shown to the client once.
#[derive(Clone)]
pub struct IssuedToken {
    pub token_id: TokenId,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token_id", &self.token_id)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Clone)]
pub struct TokenService {
    repository: Arc<dyn TokenRepository>,
    codec: Arc<TokenCodec>,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(repository: Arc<dyn TokenRepository>, codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self { repository, codec, ttl }
    }

    pub fn with_sqlx(pool: DbPool, config: &AuthConfig) -> Self {
        Self::new(
            Arc::new(SqlxTokenRepository::new(pool)),
            Arc::new(TokenCodec::from_config(config)),
            config.token_ttl(),
        )
    }

    /// Persist a new active token record for `user` and sign a bearer token for it.
    #[instrument(skip(self, user), fields(user_id = %user.id, client_name = %client_name))]
    pub async fn issue_token(&self, user: &User, client_name: &str) -> Result<IssuedToken> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::internal("Token lifetime overflows the calendar"))?;

        let record = self
            .repository
            .create_token(NewAccessToken {
                id: TokenId::new(),
                user_id: user.id.clone(),
                client_name: client_name.to_string(),
                expires_at,
            })
            .await?;

        let claims =
            self.codec.claims(&user.id, &record.id, client_name, issued_at, record.expires_at);
        let access_token = self.codec.encode(&claims)?;

        metrics::record_token_issued();
        self.refresh_active_gauge().await;
        info!(token_id = %record.id, expires_at = %record.expires_at, "access token issued");

        Ok(IssuedToken { token_id: record.id, access_token, expires_at: record.expires_at })
    }

    /// Decode a presented bearer string into its claims.
    pub fn parse_bearer_token(&self, raw: &str) -> Result<AccessClaims> {
        let token = raw.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        self.codec.decode(token).map_err(|err| {
            Error::auth(format!("Bearer token could not be parsed: {err}"), AuthErrorType::MalformedToken)
        })
    }

    /// Revoke `token_id` if and only if `user_id` owns it.
    #[instrument(skip(self), fields(user_id = %user_id, token_id = %token_id))]
    pub async fn revoke_user_token(
        &self,
        user_id: &UserId,
        token_id: &TokenId,
    ) -> Result<Option<AccessToken>> {
        let Some(token) = self.repository.revoke_user_token(user_id, token_id).await? else {
            return Ok(None);
        };

        metrics::record_token_revoked();
        self.refresh_active_gauge().await;
        info!("access token revoked");

        Ok(Some(token))
    }

    /// Remove revoked and expired token records.
    #[instrument(skip(self))]
    pub async fn purge(&self) -> Result<u64> {
        let removed = self.repository.purge(Utc::now()).await?;

        metrics::record_tokens_purged(removed);
        self.refresh_active_gauge().await;
        info!(removed, "purged revoked and expired access tokens");

        Ok(removed)
    }

    async fn refresh_active_gauge(&self) {
        match self.repository.count_active().await {
            Ok(count) => metrics::set_active_tokens(count),
            Err(err) => warn!(error = %err, "failed to refresh active token gauge"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::TokenStatus;
    use crate::auth::user::NewUser;
    use crate::config::DatabaseConfig;
    use crate::storage::{create_pool, SqlxUserRepository, UserRepository};

    async fn setup() -> (TokenService, SqlxTokenRepository, User) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        let user = SqlxUserRepository::new(pool.clone())
            .create_user(NewUser {
                id: UserId::new(),
                email: "a@x.com".into(),
                name: "A".into(),
                password_hash: "unused".into(),
            })
            .await
            .unwrap();

        (
            TokenService::with_sqlx(pool.clone(), &AuthConfig::default()),
            SqlxTokenRepository::new(pool),
            user,
        )
    }

    #[tokio::test]
    async fn issued_token_parses_back_to_its_record() {
        let (service, records, user) = setup().await;
        let issued = service.issue_token(&user, "Password Grant Client").await.unwrap();

        let claims = service.parse_bearer_token(&format!("Bearer {}", issued.access_token)).unwrap();
        assert_eq!(claims.token_id(), issued.token_id);
        assert_eq!(claims.user_id(), user.id);
        assert_eq!(claims.aud, "Password Grant Client");

        let record = records.find_user_token(&user.id, &issued.token_id).await.unwrap().unwrap();
        assert_eq!(record.status, TokenStatus::Active);
        assert_eq!(record.client_name, "Password Grant Client");
    }

    #[tokio::test]
    async fn default_lifetime_is_one_year() {
        let (service, _, user) = setup().await;
        let issued = service.issue_token(&user, "Password Grant Client").await.unwrap();

        let lifetime = issued.expires_at - Utc::now();
        assert!(lifetime > chrono::Duration::days(364));
        assert!(lifetime <= chrono::Duration::days(365));
    }

    #[tokio::test]
    async fn unparseable_bearer_is_malformed_token() {
        let (service, _, _) = setup().await;
        let err = service.parse_bearer_token("Bearer nope").unwrap_err();
        assert_eq!(err.auth_error_type(), Some(AuthErrorType::MalformedToken));
    }

    #[tokio::test]
    async fn revoke_requires_ownership_then_purge() {
        let (service, records, user) = setup().await;
        let issued = service.issue_token(&user, "Password Grant Client").await.unwrap();

        let stranger = UserId::new();
        assert!(service.revoke_user_token(&stranger, &issued.token_id).await.unwrap().is_none());
        assert_eq!(records.count_active().await.unwrap(), 1);

        let revoked =
            service.revoke_user_token(&user.id, &issued.token_id).await.unwrap().unwrap();
        assert_eq!(revoked.status, TokenStatus::Revoked);

        assert_eq!(service.purge().await.unwrap(), 1);
        assert!(records.find_user_token(&user.id, &issued.token_id).await.unwrap().is_none());
    }

    #[test]
    fn debug_redacts_bearer_string() {
        let issued = IssuedToken {
            token_id: TokenId::new(),
            access_token: "eyJ.secret.sig".into(),
            expires_at: Utc::now(),
        };
        assert!(!format!("{issued:?}").contains("eyJ.secret.sig"));
    }
}
