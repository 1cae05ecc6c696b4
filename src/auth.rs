//! Authentication and Authorization
//!
//! - Bearer token extraction
//! - Token verification into a [`Principal`]
//! - Role checks against the token's role claim
//!
//! The role is read from the token, not re-fetched from the store. A role
//! change therefore only takes effect once the holder logs in again.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::Role;
use crate::server::AppState;
use crate::token::{Principal, TokenService};

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Resolve the caller from the raw `Authorization` header value.
///
/// A missing token fails before the token service is consulted.
pub fn authenticate(tokens: &TokenService, header: Option<&str>) -> Result<Principal> {
    let token = bearer_token(header).ok_or(AppError::Unauthorized("Token missing"))?;

    tokens.verify(token).map_err(|_| AppError::Unauthorized("Invalid token"))
}

/// Fail with `Forbidden` unless the principal holds `role`
pub fn require_role(principal: &Principal, role: Role) -> Result<()> {
    if principal.role == role {
        return Ok(());
    }

    debug!(
        "Role check failed for {}: required {}, have {}",
        principal.id, role, principal.role
    );
    let message = match role {
        Role::Admin => "Admin only",
        Role::Player => "Only players can claim",
    };
    Err(AppError::Forbidden(message.to_string()))
}

/// Extractor for routes that need an authenticated caller
pub struct AuthUser(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        authenticate(&state.tokens, header).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use chrono::Utc;

    fn principal(role: Role) -> Principal {
        Principal {
            id: "acc-1".to_string(),
            role,
            name: "Nisha".to_string(),
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(Some("abc.def.ghi")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn test_authenticate_missing_and_invalid() {
        let tokens = TokenService::with_ttl_days("guard-secret", 7);

        let missing = authenticate(&tokens, None).unwrap_err();
        assert!(matches!(missing, AppError::Unauthorized("Token missing")));

        let invalid = authenticate(&tokens, Some("Bearer nope")).unwrap_err();
        assert!(matches!(invalid, AppError::Unauthorized("Invalid token")));
    }

    #[test]
    fn test_authenticate_valid() {
        let tokens = TokenService::with_ttl_days("guard-secret", 7);
        let account = Account {
            id: "acc-9".to_string(),
            name: "Aman".to_string(),
            email: "aman@test.com".to_string(),
            role: Role::Player,
            total_points: 0,
            created_at: Utc::now(),
        };
        let token = tokens.issue(&account).unwrap();
        let header = format!("Bearer {token}");

        let principal = authenticate(&tokens, Some(&header)).unwrap();
        assert_eq!(principal.id, "acc-9");
        assert_eq!(principal.role, Role::Player);
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&principal(Role::Admin), Role::Admin).is_ok());
        assert!(require_role(&principal(Role::Player), Role::Player).is_ok());

        let err = require_role(&principal(Role::Player), Role::Admin).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = require_role(&principal(Role::Admin), Role::Player).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
