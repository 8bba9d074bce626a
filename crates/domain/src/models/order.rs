//! Order and order-status domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Canonical status name for a freshly settled order.
pub const STATUS_PENDING: &str = "PENDING";

/// Canonical status name for a confirmed order.
///
/// Confirmation is terminal for points purposes: cancelling a confirmed
/// order reverses the balance and stock effects of settlement.
pub const STATUS_CONFIRMED: &str = "CONFIRMED";

/// Represents a reward redemption by a user.
///
/// Immutable once created, except for the PENDING -> CONFIRMED status
/// transition and deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reward_id: Uuid,
    pub status_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Represents an entry in the order-status catalogue.
///
/// Statuses cannot be deleted while any order references them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub id: Uuid,
    pub name: String,
}

/// Request payload for placing an order.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub reward_id: Uuid,
}

/// Request payload for creating or renaming an order status.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderStatusRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
}

/// Query parameters for the order list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    /// Admin-only: inspect another user's orders.
    pub user_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_constants() {
        assert_eq!(STATUS_PENDING, "PENDING");
        assert_eq!(STATUS_CONFIRMED, "CONFIRMED");
        assert_ne!(STATUS_PENDING, STATUS_CONFIRMED);
    }

    #[test]
    fn test_create_order_request_deserializes() {
        let id = Uuid::new_v4();
        let request: CreateOrderRequest =
            serde_json::from_str(&format!(r#"{{"rewardId": "{}"}}"#, id)).unwrap();
        assert_eq!(request.reward_id, id);
    }

    #[test]
    fn test_create_order_status_name_length() {
        let request = CreateOrderStatusRequest {
            name: "SHIPPED".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = CreateOrderStatusRequest {
            name: "X".repeat(51),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            reward_id: Uuid::new_v4(),
            status_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("userId"));
        assert!(json.contains("rewardId"));
        assert!(json.contains("statusId"));
        assert!(json.contains("createdAt"));
    }
}
