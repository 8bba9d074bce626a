//! Criticality tier domain model.
//!
//! A criticality names a severity tier and carries four ascending score
//! thresholds. The ordering invariant low < medium < high < critical is
//! enforced on both create and update through the same schema validator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_criticality_order;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents a severity tier with its score thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criticality {
    pub id: Uuid,
    pub name: String,
    pub low: i32,
    pub medium: i32,
    pub high: i32,
    pub critical: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a criticality.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_ordering"))]
pub struct CreateCriticalityRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub low: i32,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub medium: i32,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub high: i32,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub critical: i32,
}

fn validate_create_ordering(request: &CreateCriticalityRequest) -> Result<(), ValidationError> {
    validate_criticality_order(request.low, request.medium, request.high, request.critical)
}

/// Request payload for updating a criticality.
///
/// All four thresholds are required so the ordering check always sees the
/// complete tier, exactly as on create.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_ordering"))]
pub struct UpdateCriticalityRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub low: i32,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub medium: i32,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub high: i32,

    #[validate(custom(function = "shared::validation::validate_threshold"))]
    pub critical: i32,
}

fn validate_update_ordering(request: &UpdateCriticalityRequest) -> Result<(), ValidationError> {
    validate_criticality_order(request.low, request.medium, request.high, request.critical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_criticality_valid_ordering() {
        let request = CreateCriticalityRequest {
            name: "default".to_string(),
            low: 10,
            medium: 50,
            high: 100,
            critical: 500,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_criticality_rejects_equal_tiers() {
        let request = CreateCriticalityRequest {
            name: "default".to_string(),
            low: 10,
            medium: 10,
            high: 100,
            critical: 500,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_criticality_rejects_inverted_tiers() {
        let request = CreateCriticalityRequest {
            name: "default".to_string(),
            low: 500,
            medium: 100,
            high: 50,
            critical: 10,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_criticality_rejects_negative_threshold() {
        let request = CreateCriticalityRequest {
            name: "default".to_string(),
            low: -1,
            medium: 10,
            high: 20,
            critical: 30,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_criticality_same_ordering_rule() {
        let request = UpdateCriticalityRequest {
            name: None,
            low: 5,
            medium: 4,
            high: 20,
            critical: 30,
        };
        assert!(request.validate().is_err());

        let request = UpdateCriticalityRequest {
            name: Some("revised".to_string()),
            low: 5,
            medium: 15,
            high: 20,
            critical: 30,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_criticality_empty_name() {
        let request = CreateCriticalityRequest {
            name: String::new(),
            low: 1,
            medium: 2,
            high: 3,
            critical: 4,
        };
        assert!(request.validate().is_err());
    }
}
