//! Order status catalogue routes (admin).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::order::CreateOrderStatusRequest;
use domain::models::OrderStatus;
use domain::services::AuditEntryBuilder;
use persistence::repositories::OrderStatusRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::AuditService;

/// List order statuses.
///
/// GET /api/v1/order-statuses
pub async fn list_order_statuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderStatus>>, ApiError> {
    let repo = OrderStatusRepository::new(state.pool.clone());
    let entities = repo.list().await?;
    Ok(Json(entities.into_iter().map(Into::into).collect()))
}

/// Get a single order status.
///
/// GET /api/v1/order-statuses/:id
pub async fn get_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderStatus>, ApiError> {
    let repo = OrderStatusRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order status not found".to_string()))?;
    Ok(Json(entity.into()))
}

/// Create an order status (admin).
///
/// POST /api/v1/order-statuses
pub async fn create_order_status(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateOrderStatusRequest>,
) -> Result<(StatusCode, Json<OrderStatus>), ApiError> {
    request.validate()?;

    let repo = OrderStatusRepository::new(state.pool.clone());
    let entity = repo.create(&request.name).await?;

    let status: OrderStatus = entity.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::create("order_status", user_auth.user_id)
            .entity_id(status.id)
            .new_state(&status)
            .build(),
    );

    info!(status_id = %status.id, actor_id = %user_auth.user_id, "Order status created");

    Ok((StatusCode::CREATED, Json(status)))
}

/// Delete an order status (admin).
///
/// DELETE /api/v1/order-statuses/:id
///
/// Rejected while any order references the status.
pub async fn delete_order_status(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = OrderStatusRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order status not found".to_string()))?;

    if repo.is_referenced(id).await? {
        return Err(ApiError::Conflict(
            "Order status is referenced by orders and cannot be deleted".to_string(),
        ));
    }

    repo.delete(id).await?;

    let before: OrderStatus = before.into();
    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::delete("order_status", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .build(),
    );

    info!(status_id = %id, actor_id = %user_auth.user_id, "Order status deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let request = CreateOrderStatusRequest {
            name: "SHIPPED".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_empty_name() {
        let request = CreateOrderStatusRequest {
            name: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
