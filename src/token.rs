//! Session tokens
//!
//! HS256 JWTs carrying `{sub, role, name}`. The signing secret is supplied
//! once at startup and never changes for the life of the process. Tokens are
//! not tracked server-side and stay valid until they expire.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{Account, Role};

/// Default session lifetime
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

/// Verification failure. Every cause collapses into this one value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid or expired token")]
    InvalidOrExpired,
}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account id)
    pub sub: String,
    pub role: Role,
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiry (Unix timestamp)
    pub exp: i64,
}

/// Verified identity of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub role: Role,
    pub name: String,
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            name: claims.name,
        }
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn with_ttl_days(secret: &str, days: i64) -> Self {
        Self::new(secret, Duration::days(days))
    }

    /// Sign a token for an account
    pub fn issue(&self, account: &Account) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: account.id.clone(),
            role: account.role,
            name: account.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Decode and check a token
    pub fn verify(&self, token: &str) -> std::result::Result<Principal, TokenError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.into())
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                TokenError::InvalidOrExpired
            })
    }
}
