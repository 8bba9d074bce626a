//! Audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::AuditAction;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the audit_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub action: String,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntity> for domain::models::AuditLog {
    fn from(entity: AuditLogEntity) -> Self {
        Self {
            id: entity.id,
            entity_type: entity.entity_type,
            entity_id: entity.entity_id,
            // Unknown actions cannot occur under the table CHECK constraint;
            // fall back to update rather than failing the read.
            action: entity.action.parse().unwrap_or(AuditAction::Update),
            old_value: entity.old_value,
            new_value: entity.new_value,
            actor_id: entity.actor_id,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain_conversion() {
        let entity = AuditLogEntity {
            id: Uuid::new_v4(),
            entity_type: "reward".to_string(),
            entity_id: Some("d2b1f3a0-0000-0000-0000-000000000000".to_string()),
            action: "delete".to_string(),
            old_value: Some(serde_json::json!({"quantity": 1})),
            new_value: None,
            actor_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
        };

        let log: domain::models::AuditLog = entity.into();
        assert_eq!(log.action, AuditAction::Delete);
        assert_eq!(log.entity_type, "reward");
        assert!(log.old_value.is_some());
        assert!(log.new_value.is_none());
    }
}
