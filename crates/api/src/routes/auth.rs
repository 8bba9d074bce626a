//! Authentication routes for user registration, login, and token management.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::auth::AuthService;

/// Request body for user registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// User's email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// User's password (min 8 chars, 1 upper, 1 lower, 1 digit)
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// User's display name
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Request body for logout.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,

    /// Invalidate every session of the user, not just this one.
    #[serde(default)]
    pub all_devices: bool,
}

/// Token information in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Response body for register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: domain::models::User,
    pub tokens: TokensResponse,
}

/// Register a new user with email and password.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)?;

    let result = auth_service
        .register(&request.email, &request.password, &request.display_name)
        .await?;

    tracing::info!(user_id = %result.user.id, "User registered");

    let expires_in = result.access_token_expires_in;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: result.user,
            tokens: TokensResponse {
                access_token: result.access_token,
                refresh_token: result.refresh_token,
                token_type: "Bearer".to_string(),
                expires_in,
            },
        }),
    ))
}

/// Login with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)?;

    let result = auth_service.login(&request.email, &request.password).await?;

    tracing::info!(user_id = %result.user.id, "User logged in");

    let expires_in = result.access_token_expires_in;
    Ok(Json(AuthResponse {
        user: result.user,
        tokens: TokensResponse {
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        },
    }))
}

/// Exchange a refresh token for a new token pair.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokensResponse>, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)?;

    let result = auth_service.refresh(&request.refresh_token).await?;

    Ok(Json(TokensResponse {
        access_token: result.access_token,
        refresh_token: result.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: result.expires_in,
    }))
}

/// Invalidate the session behind a refresh token.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    let auth_service = AuthService::new(state.pool.clone(), &state.config.jwt)?;

    auth_service
        .logout(&request.refresh_token, request.all_devices)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            email: "hunter@example.com".to_string(),
            password: "SecureP4ss".to_string(),
            display_name: "Hunter".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_invalid_email() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "SecureP4ss".to_string(),
            display_name: "Hunter".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_empty_password() {
        let request = RegisterRequest {
            email: "hunter@example.com".to_string(),
            password: String::new(),
            display_name: "Hunter".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_long_display_name() {
        let request = RegisterRequest {
            email: "hunter@example.com".to_string(),
            password: "SecureP4ss".to_string(),
            display_name: "A".repeat(101),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_logout_request_defaults_all_devices() {
        let request: LogoutRequest =
            serde_json::from_str(r#"{"refreshToken": "token"}"#).unwrap();
        assert!(!request.all_devices);
    }

    #[test]
    fn test_refresh_request_requires_token() {
        let request = RefreshRequest {
            refresh_token: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
