//! Authentication routes: login, logout, current user and registration.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use domain::models::{LoginRequest, RegisterUserRequest, Role, UserProfile};
use domain::services::activity_helpers;
use persistence::repositories::UserRepository;
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthContext, ClientContext};
use crate::middleware::metrics::record_login_attempt;
use crate::routes::MessageResponse;
use crate::services::AuthService;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: i64,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), state.jwt.clone());
    let outcome = match auth_service.login(&request.username, &request.password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            record_login_attempt("failure");
            tracing::info!(ip = ?client.ip_address, "Login failed");
            return Err(e.into());
        }
    };
    record_login_attempt("success");

    state
        .activity
        .record(activity_helpers::user_logged_in(outcome.user.id).with_context(client))
        .await;

    tracing::info!(user_id = outcome.user.id, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: outcome.token.token,
        token_type: "Bearer".to_string(),
        expires_in: outcome.token.expires_in,
        user: outcome.user,
    }))
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless; logout only records the event. The token remains
/// valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
    ClientContext(client): ClientContext,
) -> Json<MessageResponse> {
    state
        .activity
        .record(activity_helpers::user_logged_out(auth.user_id).with_context(client))
        .await;

    tracing::info!(user_id = auth.user_id, jti = %auth.jti, "User logged out");

    Json(MessageResponse::ok("Logout successful"))
}

/// GET /api/v1/auth/current
pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(auth.user_id)
        .await?
        .map(|entity| domain::models::User::from(entity).profile())
        .unwrap_or_else(|| auth.profile());

    Ok(Json(CurrentUserResponse {
        success: true,
        user,
    }))
}

/// POST /api/v1/auth/register (admin only)
pub async fn register(
    State(state): State<AppState>,
    auth: AuthContext,
    ClientContext(client): ClientContext,
    WithRejection(Json(request), _): WithRejection<Json<RegisterUserRequest>, ApiError>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    auth.authorize(&[Role::Admin])?;
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), state.jwt.clone());
    let user = auth_service.register(request).await?;

    state
        .activity
        .record(
            activity_helpers::user_created(
                Some(auth.user_id),
                user.id,
                &user.username,
                user.role.as_str(),
            )
            .with_context(client),
        )
        .await;

    tracing::info!(user_id = user.id, created_by = auth.user_id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::jwt::IssuedToken;

    #[test]
    fn test_login_response_serialization() {
        let token = IssuedToken {
            token: "abc".to_string(),
            jti: "j".to_string(),
            expires_in: 86400,
        };
        let response = LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            token: token.token,
            token_type: "Bearer".to_string(),
            expires_in: token.expires_in,
            user: UserProfile {
                id: 1,
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                full_name: Some("Admin".to_string()),
                role: Role::Admin,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 86400);
        assert_eq!(json["user"]["role"], "admin");
        assert_eq!(json["user"]["fullName"], "Admin");
    }

    #[test]
    fn test_register_response_serialization() {
        let json = serde_json::to_value(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user_id: 9,
        })
        .unwrap();
        assert_eq!(json["userId"], 9);
    }
}
