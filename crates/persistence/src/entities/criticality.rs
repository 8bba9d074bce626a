//! Criticality entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the criticalities table.
#[derive(Debug, Clone, FromRow)]
pub struct CriticalityEntity {
    pub id: Uuid,
    pub name: String,
    pub low: i32,
    pub medium: i32,
    pub high: i32,
    pub critical: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CriticalityEntity> for domain::models::Criticality {
    fn from(entity: CriticalityEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            low: entity.low,
            medium: entity.medium,
            high: entity.high,
            critical: entity.critical,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
