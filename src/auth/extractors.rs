use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::AuthError;

/// Authenticated principal: the user id from a verified user token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

const NOT_AUTHORIZED: &str = "Not Authorized Login Again";

/// `Authorization: Bearer <jwt>`, falling back to a bare `token` header.
fn token_from_parts(parts: &Parts) -> Option<&str> {
    if let Some(auth) = parts.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        return auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim);
    }
    parts
        .headers
        .get("token")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized(NOT_AUTHORIZED))?;

        let keys = JwtKeys::from_ref(state);
        match keys.verify_user(token) {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(e) => {
                warn!(error = %e, "rejected bearer token");
                Err(AuthError::Unauthorized(NOT_AUTHORIZED))
            }
        }
    }
}
