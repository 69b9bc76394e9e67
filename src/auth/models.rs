//! Data models for issued access tokens and authenticated requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{TokenId, UserId};
use crate::errors::Error;

/// Lifecycle status for an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenStatus {
    Active,
    Revoked,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Active => "active",
            TokenStatus::Revoked => "revoked",
        }
    }
}

impl Display for TokenStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TokenStatus {
    type Err = TokenStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TokenStatus::Active),
            "revoked" => Ok(TokenStatus::Revoked),
            other => Err(TokenStatusParseError(other.to_string())),
        }
    }
}

/// Error returned when token status parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid token status: {0}")]
pub struct TokenStatusParseError(pub String);

/// Stored representation of an access token. The bearer string itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub id: TokenId,
    pub user_id: UserId,
    pub client_name: String,
    pub status: TokenStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New token database payload.
#[derive(Debug, Clone)]
pub struct NewAccessToken {
    pub id: TokenId,
    pub user_id: UserId,
    pub client_name: String,
    pub expires_at: DateTime<Utc>,
}

/// Request-scoped identity attached by the authentication guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
    pub token_id: TokenId,
    pub client_name: String,
}

/// Errors returned by the authentication guard.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized: bearer token missing")]
    MissingBearer,
    #[error("unauthorized: malformed bearer token")]
    MalformedBearer,
    #[error("unauthorized: token not found")]
    TokenNotFound,
    #[error("unauthorized: token inactive")]
    InactiveToken,
    #[error("unauthorized: token expired")]
    ExpiredToken,
    #[error(transparent)]
    Persistence(#[from] Error),
}

impl AuthError {
    /// Label used for the `auth_authentications_total` metric.
    pub fn metric_status(&self) -> &'static str {
        match self {
            AuthError::MissingBearer => "missing_bearer",
            AuthError::MalformedBearer => "malformed",
            AuthError::TokenNotFound => "not_found",
            AuthError::InactiveToken => "inactive",
            AuthError::ExpiredToken => "expired",
            AuthError::Persistence(_) => "error",
        }
    }
}
