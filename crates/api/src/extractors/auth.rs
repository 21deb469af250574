//! Request-scoped identity of the authenticated caller.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use domain::models::{Role, UserProfile};
use shared::jwt::{extract_user_id, Claims, JwtConfig, JwtError};
use std::str::FromStr;

use crate::app::AppState;
use crate::error::ApiError;

/// Identity decoded from a valid bearer token.
///
/// Inserted into request extensions by [`crate::middleware::require_auth`]
/// and extracted by handlers; nothing about the caller is kept elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub email: String,
    /// Token identifier, logged on logout.
    pub jti: String,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Result<Self, JwtError> {
        let user_id = extract_user_id(&claims)?;
        let role = Role::from_str(&claims.role).map_err(|_| JwtError::InvalidToken)?;

        Ok(Self {
            user_id,
            username: claims.username,
            role,
            email: claims.email,
            jti: claims.jti,
        })
    }

    /// Validates a raw token and builds the context.
    pub fn from_token(jwt: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt.validate_token(token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Self::from_claims(claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
    }

    /// Fails with 403 unless the caller's role satisfies `required`.
    pub fn authorize(&self, required: &[Role]) -> Result<(), ApiError> {
        if self.role.satisfies(required) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Insufficient permissions for this operation".to_string(),
            ))
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: None,
            role: self.role,
        }
    }
}

/// Returns the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already validated by the auth middleware
        if let Some(auth) = parts.extensions.get::<AuthContext>() {
            return Ok(auth.clone());
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

        AuthContext::from_token(&state.jwt, token)
    }
}
