//! Role-based access control middleware.
//!
//! Gates routes on the platform's hierarchical roles
//! (hunter < dev < admin). Requires `UserAuth` to be present in request
//! extensions, so these run after `require_user_auth`.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::Role;
use persistence::repositories::UserRepository;
use serde_json::json;

use crate::app::AppState;
use crate::middleware::user_auth::UserAuth;

/// Resolved role of the acting user, stored in request extensions for
/// handlers that branch on it.
#[derive(Debug, Clone)]
pub struct RoleContext {
    pub role: Role,
}

/// Middleware that requires at least the dev role.
pub async fn require_dev(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    require_role_impl(state, req, next, Role::Dev).await
}

/// Middleware that requires the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    require_role_impl(state, req, next, Role::Admin).await
}

async fn require_role_impl(
    state: AppState,
    mut req: Request<Body>,
    next: Next,
    min_role: Role,
) -> Response {
    let auth = match req.extensions().get::<UserAuth>() {
        Some(auth) => auth.clone(),
        None => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required",
            );
        }
    };

    let repo = UserRepository::new(state.pool.clone());
    let role = match repo.find_role(auth.user_id).await {
        Ok(Some(role)) => role,
        Ok(None) => {
            // Token may outlive a deactivated or deleted account
            return error_response(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "User account is not active",
            );
        }
        Err(e) => {
            tracing::error!("Failed to load user role: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Failed to verify permissions",
            );
        }
    };

    if !role.at_least(min_role) {
        return error_response(
            StatusCode::FORBIDDEN,
            "forbidden",
            &format!("Requires at least the {} role", min_role),
        );
    }

    req.extensions_mut().insert(RoleContext { role });
    next.run(req).await
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_context_carries_role() {
        let ctx = RoleContext { role: Role::Dev };
        assert!(ctx.role.at_least(Role::Hunter));
        assert!(!ctx.role.at_least(Role::Admin));
    }
}
