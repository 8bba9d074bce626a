//! Common validation utilities.

use validator::ValidationError;

/// Maximum points value accepted from an admin balance update.
const MAX_POINTS: i32 = 1_000_000;

/// Maximum score threshold accepted on a criticality tier.
const MAX_THRESHOLD: i32 = 100_000;

/// Validates that a points balance is within 0..=MAX_POINTS.
pub fn validate_points(points: i32) -> Result<(), ValidationError> {
    if (0..=MAX_POINTS).contains(&points) {
        Ok(())
    } else {
        let mut err = ValidationError::new("points_range");
        err.message = Some(format!("Points must be between 0 and {}", MAX_POINTS).into());
        Err(err)
    }
}

/// Validates that a reward cost is a positive number of points.
pub fn validate_points_cost(cost: i32) -> Result<(), ValidationError> {
    if (1..=MAX_POINTS).contains(&cost) {
        Ok(())
    } else {
        let mut err = ValidationError::new("points_cost_range");
        err.message = Some(format!("Points cost must be between 1 and {}", MAX_POINTS).into());
        Err(err)
    }
}

/// Validates that a criticality score threshold is within 0..=MAX_THRESHOLD.
pub fn validate_threshold(value: i32) -> Result<(), ValidationError> {
    if (0..=MAX_THRESHOLD).contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("threshold_range");
        err.message =
            Some(format!("Threshold must be between 0 and {}", MAX_THRESHOLD).into());
        Err(err)
    }
}

/// Validates the criticality ordering invariant: each tier must award
/// strictly more than the one below it.
///
/// Applied identically on create and update.
pub fn validate_criticality_order(
    low: i32,
    medium: i32,
    high: i32,
    critical: i32,
) -> Result<(), ValidationError> {
    if low < medium && medium < high && high < critical {
        Ok(())
    } else {
        let mut err = ValidationError::new("criticality_order");
        err.message = Some("Thresholds must satisfy low < medium < high < critical".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_points_valid() {
        assert!(validate_points(0).is_ok());
        assert!(validate_points(500).is_ok());
        assert!(validate_points(MAX_POINTS).is_ok());
    }

    #[test]
    fn test_validate_points_negative() {
        assert!(validate_points(-1).is_err());
    }

    #[test]
    fn test_validate_points_too_large() {
        assert!(validate_points(MAX_POINTS + 1).is_err());
    }

    #[test]
    fn test_validate_points_cost_rejects_zero() {
        assert!(validate_points_cost(0).is_err());
        assert!(validate_points_cost(1).is_ok());
    }

    #[test]
    fn test_validate_threshold_bounds() {
        assert!(validate_threshold(0).is_ok());
        assert!(validate_threshold(MAX_THRESHOLD).is_ok());
        assert!(validate_threshold(-5).is_err());
        assert!(validate_threshold(MAX_THRESHOLD + 1).is_err());
    }

    #[test]
    fn test_criticality_order_strict() {
        assert!(validate_criticality_order(1, 2, 3, 4).is_ok());
        assert!(validate_criticality_order(10, 50, 100, 500).is_ok());
    }

    #[test]
    fn test_criticality_order_rejects_equal() {
        assert!(validate_criticality_order(1, 1, 3, 4).is_err());
        assert!(validate_criticality_order(1, 2, 2, 4).is_err());
        assert!(validate_criticality_order(1, 2, 3, 3).is_err());
    }

    #[test]
    fn test_criticality_order_rejects_descending() {
        assert!(validate_criticality_order(4, 3, 2, 1).is_err());
        assert!(validate_criticality_order(1, 3, 2, 4).is_err());
    }
}
