//! Audit log domain model.
//!
//! Audit rows are append-only: the application inserts them and reads
//! them back, nothing ever mutates an existing row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of mutation an audit row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            other => Err(format!("Unknown audit action: {}", other)),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents one recorded entity mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub action: AuditAction,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting an audit row.
#[derive(Debug, Clone)]
pub struct CreateAuditLogInput {
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub action: AuditAction,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub actor_id: Option<Uuid>,
}

/// Query parameters for the audit log list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditLogsQuery {
    pub entity_type: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_roundtrip() {
        for action in [AuditAction::Create, AuditAction::Update, AuditAction::Delete] {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_audit_action_parse_unknown() {
        assert!("upsert".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_audit_action_display() {
        assert_eq!(AuditAction::Delete.to_string(), "delete");
    }

    #[test]
    fn test_audit_log_serializes_camel_case() {
        let log = AuditLog {
            id: Uuid::new_v4(),
            entity_type: "reward".to_string(),
            entity_id: Some(Uuid::new_v4().to_string()),
            action: AuditAction::Update,
            old_value: Some(serde_json::json!({"quantity": 3})),
            new_value: Some(serde_json::json!({"quantity": 2})),
            actor_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("entityType"));
        assert!(json.contains("oldValue"));
        assert!(json.contains("newValue"));
        assert!(json.contains("actorId"));
    }
}
