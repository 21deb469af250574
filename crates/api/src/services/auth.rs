//! Credential checks, token issuance and account creation.

use chrono::Utc;
use domain::models::{NewUser, RegisterUserRequest, User, UserProfile};
use persistence::repositories::UserRepository;
use shared::jwt::{IssuedToken, JwtConfig, JwtError, TokenSubject};
use shared::password::{hash_password, verify_against_dummy, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::error::ApiError;

/// Message shared by every credential failure.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, wrong password or inactive account. Deliberately
    /// indistinguishable to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username or email already registered")]
    AlreadyRegistered,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()),
            AuthError::AlreadyRegistered => {
                ApiError::Conflict("Username or email already registered".to_string())
            }
            AuthError::Database(e) => ApiError::from(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: IssuedToken,
    pub user: UserProfile,
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Verifies credentials and issues a token.
    ///
    /// Every failure path runs one Argon2 verification so response timing
    /// does not reveal whether the username exists.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user: Option<User> = self
            .users
            .find_by_username(username.trim())
            .await?
            .map(Into::into);

        let password = password.to_string();
        let Some(user) = user else {
            run_blocking(move || verify_against_dummy(&password)).await?;
            return Err(AuthError::InvalidCredentials);
        };

        let hash = user.password_hash.clone();
        let verified = run_blocking(move || verify_password(&password, &hash)).await?;
        let password_ok = match verified {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(user_id = user.id, error = %e, "Stored password hash is unusable");
                false
            }
        };

        if !password_ok || !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        let role = user.role.as_str();
        let token = self.jwt.generate_token(TokenSubject {
            user_id: user.id,
            username: &user.username,
            role,
            email: &user.email,
        })?;

        if let Err(e) = self.users.update_last_login(user.id, Utc::now()).await {
            tracing::warn!(user_id = user.id, error = %e, "Failed to update last login");
        }

        Ok(LoginOutcome {
            token,
            user: user.profile(),
        })
    }

    /// Creates an account. Duplicate username or email is a conflict.
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, AuthError> {
        let password = request.password.clone();
        let password_hash = run_blocking(move || hash_password(&password)).await??;
        let new_user = NewUser::from_request(request, password_hash);

        match self.users.create(&new_user).await {
            Ok(entity) => Ok(entity.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::AlreadyRegistered)
            }
            Err(e) => Err(AuthError::Database(e)),
        }
    }
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn run_blocking<F, T>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Internal(format!("Password task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn test_invalid_credentials_maps_to_401() {
        let api: ApiError = AuthError::InvalidCredentials.into();
        match &api {
            ApiError::Unauthorized(msg) => assert_eq!(msg, INVALID_CREDENTIALS),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
        assert_eq!(api.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_already_registered_maps_to_409() {
        let api: ApiError = AuthError::AlreadyRegistered.into();
        assert_eq!(api.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_token_error_maps_to_500() {
        let api: ApiError = AuthError::Token(JwtError::InvalidToken).into();
        assert_eq!(api.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        let value = run_blocking(|| 40 + 2).await.unwrap();
        assert_eq!(value, 42);
    }
}
