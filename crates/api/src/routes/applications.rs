//! Application catalogue routes.
//!
//! Reads are open to any authenticated user; mutations require the dev
//! role and are audited.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::application::{CreateApplicationRequest, UpdateApplicationRequest};
use domain::models::Application;
use domain::services::AuditEntryBuilder;
use persistence::repositories::ApplicationRepository;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::AuditService;

/// Query parameters for listing applications.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListApplicationsQuery {
    /// Only include applications that accept new reports (default: false)
    #[serde(default)]
    pub active_only: bool,
}

/// List applications.
///
/// GET /api/v1/applications
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let repo = ApplicationRepository::new(state.pool.clone());
    let entities = repo.list(query.active_only).await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

/// Get a single application.
///
/// GET /api/v1/applications/:id
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, ApiError> {
    let repo = ApplicationRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;
    Ok(Json(entity.into()))
}

/// Create an application (dev).
///
/// POST /api/v1/applications
pub async fn create_application(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    request.validate()?;

    let repo = ApplicationRepository::new(state.pool.clone());
    let entity = repo
        .create(
            &request.name,
            request.description.as_deref(),
            request.url.as_deref(),
            request.logo_url.as_deref(),
            request.active,
        )
        .await?;

    let application: Application = entity.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::create("application", user_auth.user_id)
            .entity_id(application.id)
            .new_state(&application)
            .build(),
    );

    info!(
        application_id = %application.id,
        actor_id = %user_auth.user_id,
        "Application created"
    );

    Ok((StatusCode::CREATED, Json(application)))
}

/// Update an application (dev).
///
/// PUT /api/v1/applications/:id
pub async fn update_application(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<Application>, ApiError> {
    request.validate()?;

    let repo = ApplicationRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    let after = repo
        .update(
            id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.url.as_deref(),
            request.logo_url.as_deref(),
            request.active,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    let before: Application = before.into();
    let after: Application = after.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::update("application", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .new_state(&after)
            .build(),
    );

    info!(application_id = %id, actor_id = %user_auth.user_id, "Application updated");

    Ok(Json(after))
}

/// Delete an application (dev).
///
/// DELETE /api/v1/applications/:id
///
/// Rejected while any report references the application.
pub async fn delete_application(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ApplicationRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    if repo.is_referenced(id).await? {
        return Err(ApiError::Conflict(
            "Application has reports and cannot be deleted".to_string(),
        ));
    }

    repo.delete(id).await?;

    let before: Application = before.into();
    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::delete("application", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .build(),
    );

    info!(application_id = %id, actor_id = %user_auth.user_id, "Application deleted");

    Ok(StatusCode::NO_CONTENT)
}
