//! Bearer token authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{bearer_token, AuthContext};

/// Middleware that requires a valid JWT.
///
/// Rejects the request with 401 when the `Authorization: Bearer` header is
/// missing, malformed, expired or signed with another key. On success the
/// decoded [`AuthContext`] is stored in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Some(token) => token.to_string(),
        None => {
            return ApiError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    match AuthContext::from_token(&state.jwt, &token) {
        Ok(auth) => {
            tracing::Span::current().record("user_id", auth.user_id);
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
