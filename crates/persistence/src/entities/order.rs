//! Order entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the orders table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub status_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<OrderEntity> for domain::models::Order {
    fn from(entity: OrderEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            reward_id: entity.reward_id,
            status_id: entity.status_id,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the order_statuses table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderStatusEntity {
    pub id: Uuid,
    pub name: String,
}

impl From<OrderStatusEntity> for domain::models::OrderStatus {
    fn from(entity: OrderStatusEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

/// Order row joined with its reward and status names for list views.
#[derive(Debug, Clone, FromRow)]
pub struct OrderDetailsEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub reward_name: String,
    pub points_cost: i32,
    pub status_id: Uuid,
    pub status_name: String,
    pub created_at: DateTime<Utc>,
}
