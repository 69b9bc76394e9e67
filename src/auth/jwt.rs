//! Signed bearer tokens.
//!
//! Every bearer string is an HS256 JWT whose `jti` names the access token
//! record it was minted for. The signature proves the token came from this
//! service; the record decides whether it is still usable.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::models::AuthError;
use crate::config::AuthConfig;
use crate::domain::{TokenId, UserId};
use crate::errors::{Error, Result};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Owning user id
    pub sub: String,
    /// Client grant the token was issued for
    pub aud: String,
    pub iss: String,
    /// Access token record id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn token_id(&self) -> TokenId {
        TokenId::from(self.jti.clone())
    }

    pub fn user_id(&self) -> UserId {
        UserId::from(self.sub.clone())
    }
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl TokenCodec {
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: issuer.to_string(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), &config.jwt_issuer, &config.client_name)
    }

    /// Build the claims for a token record owned by `user_id`.
    pub fn claims(
        &self,
        user_id: &UserId,
        token_id: &TokenId,
        audience: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> AccessClaims {
        AccessClaims {
            sub: user_id.to_string(),
            aud: audience.to_string(),
            iss: self.issuer.clone(),
            jti: token_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn encode(&self, claims: &AccessClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| Error::internal(format!("Failed to sign access token: {e}")))
    }

    /// Verify signature, issuer, audience and expiry.
    pub fn decode(&self, token: &str) -> std::result::Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::MalformedBearer,
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").field("issuer", &self.issuer).finish_non_exhaustive()
    }
}
