//! Order routes: settlement, confirmation, cancellation, and queries.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use domain::models::order::{CreateOrderRequest, ListOrdersQuery};
use domain::models::{Order, Role};
use persistence::repositories::{OrderRepository, UserRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_order_settled;

/// Response for a freshly settled order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledOrderResponse {
    pub order: Order,
    /// Point balance left after the deduction.
    pub remaining_points: i32,
    /// Reward stock left after the decrement.
    pub remaining_quantity: i32,
}

/// One row of an order listing, joined with reward and status names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailsResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub reward_name: String,
    pub points_cost: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Response for paged order listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderDetailsResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Resolve the caller's role, treating a missing account as unauthorized.
async fn caller_role(state: &AppState, user_id: Uuid) -> Result<Role, ApiError> {
    UserRepository::new(state.pool.clone())
        .find_role(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User account is not active".to_string()))
}

/// Place an order for a reward.
///
/// POST /api/v1/orders
///
/// Settlement is atomic: the order row, the point deduction, the stock
/// decrement, and the audit entry commit or roll back together.
pub async fn create_order(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<SettledOrderResponse>), ApiError> {
    request.validate()?;

    let repo = OrderRepository::new(state.pool.clone());
    let settled = repo.settle(user_auth.user_id, request.reward_id).await?;

    record_order_settled();
    info!(
        order_id = %settled.order.id,
        user_id = %user_auth.user_id,
        reward_id = %request.reward_id,
        remaining_points = settled.remaining_points,
        "Order settled"
    );

    Ok((
        StatusCode::CREATED,
        Json(SettledOrderResponse {
            order: settled.order.into(),
            remaining_points: settled.remaining_points,
            remaining_quantity: settled.remaining_quantity,
        }),
    ))
}

/// List orders.
///
/// GET /api/v1/orders
///
/// Users see their own orders; admins may pass `userId` to inspect
/// another account.
pub async fn list_orders(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListOrdersResponse>, ApiError> {
    let subject = match query.user_id {
        Some(other) if other != user_auth.user_id => {
            let role = caller_role(&state, user_auth.user_id).await?;
            if !role.at_least(Role::Admin) {
                return Err(ApiError::Forbidden(
                    "Only admins can list another user's orders".to_string(),
                ));
            }
            other
        }
        _ => user_auth.user_id,
    };

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let repo = OrderRepository::new(state.pool.clone());
    let (entities, total) = repo.list_for_user(subject, page, per_page).await?;

    let orders = entities
        .into_iter()
        .map(|e| OrderDetailsResponse {
            id: e.id,
            user_id: e.user_id,
            reward_id: e.reward_id,
            reward_name: e.reward_name,
            points_cost: e.points_cost,
            status: e.status_name,
            created_at: e.created_at,
        })
        .collect();

    Ok(Json(ListOrdersResponse {
        orders,
        total,
        page,
        per_page,
    }))
}

/// Get a single order.
///
/// GET /api/v1/orders/:id
///
/// Visible to its owner and to admins.
pub async fn get_order(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let repo = OrderRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if entity.user_id != user_auth.user_id {
        let role = caller_role(&state, user_auth.user_id).await?;
        if !role.at_least(Role::Admin) {
            return Err(ApiError::Forbidden(
                "You can only view your own orders".to_string(),
            ));
        }
    }

    Ok(Json(entity.into()))
}

/// Confirm a pending order (dev).
///
/// PUT /api/v1/orders/:id/confirm
pub async fn confirm_order(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let repo = OrderRepository::new(state.pool.clone());
    let order = repo.confirm(id, user_auth.user_id).await?;

    info!(order_id = %id, actor_id = %user_auth.user_id, "Order confirmed");

    Ok(Json(order.into()))
}

/// Cancel an order.
///
/// DELETE /api/v1/orders/:id
///
/// Owners and admins may cancel. A CONFIRMED order has its point and
/// stock effects reversed before the row is removed; a PENDING order is
/// deleted as-is.
pub async fn delete_order(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = OrderRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if entity.user_id != user_auth.user_id {
        let role = caller_role(&state, user_auth.user_id).await?;
        if !role.at_least(Role::Admin) {
            return Err(ApiError::Forbidden(
                "You can only cancel your own orders".to_string(),
            ));
        }
    }

    repo.cancel(id, user_auth.user_id).await?;

    info!(order_id = %id, actor_id = %user_auth.user_id, "Order cancelled");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_order_response_serialization() {
        let response = SettledOrderResponse {
            order: Order {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                reward_id: Uuid::new_v4(),
                status_id: Uuid::new_v4(),
                created_at: Utc::now(),
            },
            remaining_points: 120,
            remaining_quantity: 4,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("remainingPoints"));
        assert!(json.contains("remainingQuantity"));
    }

    #[test]
    fn test_list_orders_query_accepts_user_id() {
        let id = Uuid::new_v4();
        let query: ListOrdersQuery =
            serde_json::from_str(&format!(r#"{{"userId": "{}"}}"#, id)).unwrap();
        assert_eq!(query.user_id, Some(id));
    }
}
