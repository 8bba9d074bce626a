//! Reward catalogue domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Represents a catalogue item redeemable for points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Point price per unit. Always at least 1.
    pub points_cost: i32,
    /// Units in stock. Never negative; decremented on order creation and
    /// restored when a confirmed order is cancelled.
    pub quantity: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_available() -> bool {
    true
}

/// Request payload for creating a reward.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_points_cost"))]
    pub points_cost: i32,

    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: i32,

    #[serde(default = "default_available")]
    pub available: bool,
}

/// Request payload for updating a reward (partial update).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRewardRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_points_cost"))]
    pub points_cost: Option<i32>,

    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: Option<i32>,

    pub available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_reward_valid() {
        let request = CreateRewardRequest {
            name: "Conference ticket".to_string(),
            description: None,
            points_cost: 750,
            quantity: 3,
            available: true,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_reward_zero_cost_rejected() {
        let request = CreateRewardRequest {
            name: "Sticker pack".to_string(),
            description: None,
            points_cost: 0,
            quantity: 100,
            available: true,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_reward_negative_quantity_rejected() {
        let request = CreateRewardRequest {
            name: "Sticker pack".to_string(),
            description: None,
            points_cost: 10,
            quantity: -1,
            available: true,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_reward_defaults_available() {
        let request: CreateRewardRequest =
            serde_json::from_str(r#"{"name": "Mug", "pointsCost": 50, "quantity": 10}"#).unwrap();
        assert!(request.available);
    }

    #[test]
    fn test_update_reward_partial() {
        let request: UpdateRewardRequest =
            serde_json::from_str(r#"{"quantity": 0, "available": false}"#).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.quantity, Some(0));
        assert_eq!(request.available, Some(false));
    }
}
