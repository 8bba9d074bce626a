//! Reward catalogue routes.
//!
//! Reads are open to any authenticated user; mutations require the admin
//! role and are audited.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::reward::{CreateRewardRequest, UpdateRewardRequest};
use domain::models::Reward;
use domain::services::AuditEntryBuilder;
use persistence::repositories::RewardRepository;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::AuditService;

/// Query parameters for listing rewards.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRewardsQuery {
    /// Only include rewards that can currently be ordered (default: false)
    #[serde(default)]
    pub available_only: bool,
}

/// List rewards.
///
/// GET /api/v1/rewards
pub async fn list_rewards(
    State(state): State<AppState>,
    Query(query): Query<ListRewardsQuery>,
) -> Result<Json<Vec<Reward>>, ApiError> {
    let repo = RewardRepository::new(state.pool.clone());
    let entities = repo.list(query.available_only).await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

/// Get a single reward.
///
/// GET /api/v1/rewards/:id
pub async fn get_reward(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reward>, ApiError> {
    let repo = RewardRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reward not found".to_string()))?;
    Ok(Json(entity.into()))
}

/// Create a reward (admin).
///
/// POST /api/v1/rewards
pub async fn create_reward(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateRewardRequest>,
) -> Result<(StatusCode, Json<Reward>), ApiError> {
    request.validate()?;

    let repo = RewardRepository::new(state.pool.clone());
    let entity = repo
        .create(
            &request.name,
            request.description.as_deref(),
            request.points_cost,
            request.quantity,
            request.available,
        )
        .await?;

    let reward: Reward = entity.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::create("reward", user_auth.user_id)
            .entity_id(reward.id)
            .new_state(&reward)
            .build(),
    );

    info!(reward_id = %reward.id, actor_id = %user_auth.user_id, "Reward created");

    Ok((StatusCode::CREATED, Json(reward)))
}

/// Update a reward (admin).
///
/// PUT /api/v1/rewards/:id
pub async fn update_reward(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRewardRequest>,
) -> Result<Json<Reward>, ApiError> {
    request.validate()?;

    let repo = RewardRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reward not found".to_string()))?;

    let after = repo
        .update(
            id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.points_cost,
            request.quantity,
            request.available,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Reward not found".to_string()))?;

    let before: Reward = before.into();
    let after: Reward = after.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::update("reward", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .new_state(&after)
            .build(),
    );

    info!(reward_id = %id, actor_id = %user_auth.user_id, "Reward updated");

    Ok(Json(after))
}

/// Delete a reward (admin).
///
/// DELETE /api/v1/rewards/:id
///
/// Rejected while any order references the reward.
pub async fn delete_reward(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = RewardRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reward not found".to_string()))?;

    if repo.is_referenced(id).await? {
        return Err(ApiError::Conflict(
            "Reward has orders and cannot be deleted".to_string(),
        ));
    }

    repo.delete(id).await?;

    let before: Reward = before.into();
    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::delete("reward", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .build(),
    );

    info!(reward_id = %id, actor_id = %user_auth.user_id, "Reward deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListRewardsQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.available_only);
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateRewardRequest = serde_json::from_str(
            r#"{"name": "Hoodie", "pointsCost": 300, "quantity": 12}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
