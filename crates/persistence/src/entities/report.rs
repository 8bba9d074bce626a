//! Report entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::ReportStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the reports table.
#[derive(Debug, Clone, FromRow)]
pub struct ReportEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub application_id: Uuid,
    pub criticality_id: Uuid,
    pub reporter_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReportEntity> for domain::models::Report {
    fn from(entity: ReportEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            application_id: entity.application_id,
            criticality_id: entity.criticality_id,
            reporter_id: entity.reporter_id,
            status: ReportStatus::parse(&entity.status).unwrap_or(ReportStatus::Pending),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
