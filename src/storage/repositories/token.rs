//! Access token repository
//!
//! Persists the records behind issued bearer tokens. Only metadata is stored;
//! the signed bearer string is handed to the client once and never written.

use crate::auth::models::{AccessToken, NewAccessToken, TokenStatus};
use crate::db_span;
use crate::domain::{TokenId, UserId};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{instrument, Instrument};

const TOKEN_COLUMNS: &str =
    "id, user_id, client_name, status, expires_at, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
struct AccessTokenRow {
    pub id: String,
    pub user_id: String,
    pub client_name: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create_token(&self, token: NewAccessToken) -> Result<AccessToken>;
    async fn find_token(&self, id: &TokenId) -> Result<Option<AccessToken>>;
    /// Look up a token only among those owned by `user_id`.
    async fn find_user_token(&self, user_id: &UserId, id: &TokenId)
        -> Result<Option<AccessToken>>;
    /// Revoke `id` only if it belongs to `user_id`; `None` when it does not exist for that owner.
    async fn revoke_user_token(&self, user_id: &UserId, id: &TokenId)
        -> Result<Option<AccessToken>>;
    async fn count_active(&self) -> Result<i64>;
    /// Delete revoked tokens and tokens that expired before `now`.
    async fn purge(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[derive(Debug, Clone)]
pub struct SqlxTokenRepository {
    pool: DbPool,
}

impl SqlxTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn to_model(&self, row: AccessTokenRow) -> Result<AccessToken> {
        let status = TokenStatus::from_str(&row.status).map_err(|_| {
            Error::validation(format!(
                "Unknown token status '{}' for token {}",
                row.status, row.id
            ))
        })?;

        Ok(AccessToken {
            id: TokenId::from(row.id),
            user_id: UserId::from(row.user_id),
            client_name: row.client_name,
            status,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl TokenRepository for SqlxTokenRepository {
    #[instrument(skip(self, token), fields(token_id = %token.id, user_id = %token.user_id), name = "db_create_token")]
    async fn create_token(&self, token: NewAccessToken) -> Result<AccessToken> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO access_tokens (id, user_id, client_name, status, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&token.id)
        .bind(&token.user_id)
        .bind(&token.client_name)
        .bind(TokenStatus::Active.as_str())
        .bind(token.expires_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to create access token"))?;

        self.find_token(&token.id)
            .await?
            .ok_or_else(|| Error::internal("Access token not found after creation"))
    }

    #[instrument(skip(self), fields(token_id = %id), name = "db_find_token")]
    async fn find_token(&self, id: &TokenId) -> Result<Option<AccessToken>> {
        let row: Option<AccessTokenRow> =
            sqlx::query_as(&format!("SELECT {TOKEN_COLUMNS} FROM access_tokens WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| Error::database(err, "Failed to fetch access token"))?;

        row.map(|r| self.to_model(r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id, token_id = %id), name = "db_find_user_token")]
    async fn find_user_token(
        &self,
        user_id: &UserId,
        id: &TokenId,
    ) -> Result<Option<AccessToken>> {
        let row: Option<AccessTokenRow> = sqlx::query_as(&format!(
            "SELECT {TOKEN_COLUMNS} FROM access_tokens WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to fetch user access token"))?;

        row.map(|r| self.to_model(r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id, token_id = %id), name = "db_revoke_user_token")]
    async fn revoke_user_token(
        &self,
        user_id: &UserId,
        id: &TokenId,
    ) -> Result<Option<AccessToken>> {
        let row: Option<AccessTokenRow> = sqlx::query_as(&format!(
            "UPDATE access_tokens SET status = $1, updated_at = $2 \
             WHERE id = $3 AND user_id = $4 RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(TokenStatus::Revoked.as_str())
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::database(err, "Failed to revoke access token"))?;

        row.map(|r| self.to_model(r)).transpose()
    }

    async fn count_active(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM access_tokens WHERE status = $1 AND expires_at > $2",
        )
        .bind(TokenStatus::Active.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .instrument(db_span!("access_tokens.count_active"))
        .await
        .map_err(|err| Error::database(err, "Failed to count active tokens"))
    }

    async fn purge(&self, now: DateTime<Utc>) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM access_tokens WHERE status != $1 OR expires_at < $2")
                .bind(TokenStatus::Active.as_str())
                .bind(now)
                .execute(&self.pool)
                .instrument(db_span!("access_tokens.purge"))
                .await
                .map_err(|err| Error::database(err, "Failed to purge access tokens"))?;

        Ok(result.rows_affected())
    }
}
