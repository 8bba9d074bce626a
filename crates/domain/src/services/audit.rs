//! Audit entry construction.
//!
//! Provides a fluent builder that turns entity snapshots into
//! `CreateAuditLogInput` rows. Snapshots are plain serde serializations of
//! the entity before and after the mutation.

use crate::models::{AuditAction, CreateAuditLogInput};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Serializes an entity into a JSON snapshot.
///
/// Serialization failures degrade to `null` rather than failing the
/// mutation that is being audited.
pub fn snapshot<T: Serialize>(entity: &T) -> JsonValue {
    serde_json::to_value(entity).unwrap_or(JsonValue::Null)
}

/// Builder for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
    entity_type: String,
    entity_id: Option<String>,
    action: AuditAction,
    old_value: Option<JsonValue>,
    new_value: Option<JsonValue>,
    actor_id: Option<Uuid>,
}

impl AuditEntryBuilder {
    /// Start an entry for an entity creation.
    pub fn create(entity_type: impl Into<String>, actor_id: Uuid) -> Self {
        Self::new(entity_type, AuditAction::Create, Some(actor_id))
    }

    /// Start an entry for an entity update.
    pub fn update(entity_type: impl Into<String>, actor_id: Uuid) -> Self {
        Self::new(entity_type, AuditAction::Update, Some(actor_id))
    }

    /// Start an entry for an entity deletion.
    pub fn delete(entity_type: impl Into<String>, actor_id: Uuid) -> Self {
        Self::new(entity_type, AuditAction::Delete, Some(actor_id))
    }

    /// Start an entry for a mutation performed by the system itself.
    pub fn system(entity_type: impl Into<String>, action: AuditAction) -> Self {
        Self::new(entity_type, action, None)
    }

    fn new(entity_type: impl Into<String>, action: AuditAction, actor_id: Option<Uuid>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: None,
            action,
            old_value: None,
            new_value: None,
            actor_id,
        }
    }

    /// Set the ID of the entity being acted upon.
    pub fn entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Record the entity state before the mutation.
    pub fn old_state<T: Serialize>(mut self, entity: &T) -> Self {
        self.old_value = Some(snapshot(entity));
        self
    }

    /// Record the entity state after the mutation.
    pub fn new_state<T: Serialize>(mut self, entity: &T) -> Self {
        self.new_value = Some(snapshot(entity));
        self
    }

    /// Finish building the audit input.
    pub fn build(self) -> CreateAuditLogInput {
        CreateAuditLogInput {
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            action: self.action,
            old_value: self.old_value,
            new_value: self.new_value,
            actor_id: self.actor_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        quantity: i32,
    }

    #[test]
    fn test_create_entry() {
        let actor = Uuid::new_v4();
        let entity_id = Uuid::new_v4();
        let input = AuditEntryBuilder::create("reward", actor)
            .entity_id(entity_id)
            .new_state(&Sample { name: "mug", quantity: 5 })
            .build();

        assert_eq!(input.entity_type, "reward");
        assert_eq!(input.entity_id, Some(entity_id.to_string()));
        assert_eq!(input.action, AuditAction::Create);
        assert_eq!(input.actor_id, Some(actor));
        assert!(input.old_value.is_none());
        assert_eq!(input.new_value.unwrap()["quantity"], 5);
    }

    #[test]
    fn test_update_entry_has_both_snapshots() {
        let input = AuditEntryBuilder::update("reward", Uuid::new_v4())
            .old_state(&Sample { name: "mug", quantity: 5 })
            .new_state(&Sample { name: "mug", quantity: 4 })
            .build();

        assert_eq!(input.old_value.unwrap()["quantity"], 5);
        assert_eq!(input.new_value.unwrap()["quantity"], 4);
    }

    #[test]
    fn test_delete_entry() {
        let input = AuditEntryBuilder::delete("order", Uuid::new_v4())
            .old_state(&Sample { name: "mug", quantity: 1 })
            .build();

        assert_eq!(input.action, AuditAction::Delete);
        assert!(input.new_value.is_none());
    }

    #[test]
    fn test_system_entry_has_no_actor() {
        let input = AuditEntryBuilder::system("user", AuditAction::Update).build();
        assert!(input.actor_id.is_none());
    }

    #[test]
    fn test_snapshot_plain_value() {
        let value = snapshot(&Sample { name: "mug", quantity: 2 });
        assert_eq!(value["name"], "mug");
    }
}
