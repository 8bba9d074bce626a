//! Reward entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the rewards table.
#[derive(Debug, Clone, FromRow)]
pub struct RewardEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub points_cost: i32,
    pub quantity: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RewardEntity> for domain::models::Reward {
    fn from(entity: RewardEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            points_cost: entity.points_cost,
            quantity: entity.quantity,
            available: entity.available,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
