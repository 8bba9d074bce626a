//! User profile routes and admin user management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::user::{AdminUpdateUserRequest, ListUsersQuery, UpdateProfileRequest};
use domain::models::User;
use domain::services::AuditEntryBuilder;
use persistence::repositories::UserRepository;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::AuditService;

/// Response for paged user listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Get current user profile.
///
/// GET /api/v1/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(user_auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("User account is disabled".to_string()));
    }

    Ok(Json(user.into()))
}

/// Update current user profile.
///
/// PUT /api/v1/users/me
pub async fn update_current_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());

    let Some(display_name) = request.display_name else {
        // Nothing to change, return the current profile
        return get_current_user(State(state), user_auth).await;
    };

    let user = repo
        .update_display_name(user_auth.user_id, &display_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %user_auth.user_id, "Profile updated");

    Ok(Json(user.into()))
}

/// List users (admin).
///
/// GET /api/v1/admin/users
pub async fn admin_list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let repo = UserRepository::new(state.pool.clone());
    let (entities, total) = repo.list(page, per_page, query.role).await?;

    Ok(Json(ListUsersResponse {
        users: entities.into_iter().map(Into::into).collect(),
        total,
        page,
        per_page,
    }))
}

/// Update a user's role, active flag, or balances (admin).
///
/// PUT /api/v1/admin/users/:user_id
///
/// The points field is the only balance mutation outside order
/// settlement; the change is audited with before/after snapshots.
pub async fn admin_update_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AdminUpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let after = repo
        .admin_update(
            user_id,
            request.role,
            request.is_active,
            request.points,
            request.score,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let before: User = before.into();
    let after: User = after.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::update("user", user_auth.user_id)
            .entity_id(user_id)
            .old_state(&before)
            .new_state(&after)
            .build(),
    );

    info!(
        user_id = %user_id,
        actor_id = %user_auth.user_id,
        "User updated by admin"
    );

    Ok(Json(after))
}

/// Delete a user account (admin).
///
/// DELETE /api/v1/admin/users/:user_id
pub async fn admin_delete_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if user_id == user_auth.user_id {
        return Err(ApiError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    let repo = UserRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let deleted = repo.delete(user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let before: User = before.into();
    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::delete("user", user_auth.user_id)
            .entity_id(user_id)
            .old_state(&before)
            .build(),
    );

    info!(
        user_id = %user_id,
        actor_id = %user_auth.user_id,
        "User deleted by admin"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Role;

    #[test]
    fn test_admin_update_request_validation() {
        let request = AdminUpdateUserRequest {
            role: Some(Role::Dev),
            is_active: None,
            points: Some(100),
            score: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_admin_update_request_negative_points() {
        let request = AdminUpdateUserRequest {
            role: None,
            is_active: None,
            points: Some(-5),
            score: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_list_users_response_serialization() {
        let response = ListUsersResponse {
            users: vec![],
            total: 0,
            page: 1,
            per_page: 50,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("perPage"));
        assert!(json.contains("\"total\":0"));
    }
}
