//! Criticality tier routes.
//!
//! Reads are open to any authenticated user; mutations require the admin
//! role. Create and update run the same strict-ordering validation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::criticality::{CreateCriticalityRequest, UpdateCriticalityRequest};
use domain::models::Criticality;
use domain::services::AuditEntryBuilder;
use persistence::repositories::CriticalityRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::AuditService;

/// List criticality tiers.
///
/// GET /api/v1/criticalities
pub async fn list_criticalities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Criticality>>, ApiError> {
    let repo = CriticalityRepository::new(state.pool.clone());
    let entities = repo.list().await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

/// Get a single criticality tier.
///
/// GET /api/v1/criticalities/:id
pub async fn get_criticality(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Criticality>, ApiError> {
    let repo = CriticalityRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Criticality not found".to_string()))?;
    Ok(Json(entity.into()))
}

/// Create a criticality tier (admin).
///
/// POST /api/v1/criticalities
pub async fn create_criticality(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateCriticalityRequest>,
) -> Result<(StatusCode, Json<Criticality>), ApiError> {
    request.validate()?;

    let repo = CriticalityRepository::new(state.pool.clone());
    let entity = repo
        .create(
            &request.name,
            request.low,
            request.medium,
            request.high,
            request.critical,
        )
        .await?;

    let criticality: Criticality = entity.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::create("criticality", user_auth.user_id)
            .entity_id(criticality.id)
            .new_state(&criticality)
            .build(),
    );

    info!(
        criticality_id = %criticality.id,
        actor_id = %user_auth.user_id,
        "Criticality created"
    );

    Ok((StatusCode::CREATED, Json(criticality)))
}

/// Update a criticality tier (admin).
///
/// PUT /api/v1/criticalities/:id
pub async fn update_criticality(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCriticalityRequest>,
) -> Result<Json<Criticality>, ApiError> {
    request.validate()?;

    let repo = CriticalityRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Criticality not found".to_string()))?;

    let after = repo
        .update(
            id,
            request.name.as_deref(),
            request.low,
            request.medium,
            request.high,
            request.critical,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Criticality not found".to_string()))?;

    let before: Criticality = before.into();
    let after: Criticality = after.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::update("criticality", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .new_state(&after)
            .build(),
    );

    info!(criticality_id = %id, actor_id = %user_auth.user_id, "Criticality updated");

    Ok(Json(after))
}

/// Delete a criticality tier (admin).
///
/// DELETE /api/v1/criticalities/:id
///
/// Rejected while any report references the tier.
pub async fn delete_criticality(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = CriticalityRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Criticality not found".to_string()))?;

    if repo.is_referenced(id).await? {
        return Err(ApiError::Conflict(
            "Criticality is referenced by reports and cannot be deleted".to_string(),
        ));
    }

    repo.delete(id).await?;

    let before: Criticality = before.into();
    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::delete("criticality", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .build(),
    );

    info!(criticality_id = %id, actor_id = %user_auth.user_id, "Criticality deleted");

    Ok(StatusCode::NO_CONTENT)
}
