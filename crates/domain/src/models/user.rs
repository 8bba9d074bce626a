//! User domain model and role hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Platform role, ordered from least to most privileged.
///
/// Hunters submit reports and redeem rewards; devs additionally manage
/// applications and triage reports; admins manage everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hunter,
    Dev,
    Admin,
}

impl Role {
    /// Numeric rank used for minimum-role checks.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Hunter => 1,
            Role::Dev => 2,
            Role::Admin => 3,
        }
    }

    /// Returns true if this role is at least as privileged as `min`.
    pub fn at_least(&self, min: Role) -> bool {
        self.rank() >= min.rank()
    }

    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hunter => "hunter",
            Role::Dev => "dev",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hunter" => Ok(Role::Hunter),
            "dev" => Ok(Role::Dev),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a user account with its points ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    /// Redeemable point balance. Never negative; mutates only through
    /// order settlement/reversal or an explicit admin update.
    pub points: i32,
    /// Lifetime score earned from accepted reports.
    pub score: i32,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Request payload for updating one's own profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: Option<String>,
}

/// Request payload for an admin user update.
///
/// The points field is the only way a balance changes outside order
/// settlement; the mutation is audited with before/after snapshots.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub role: Option<Role>,

    pub is_active: Option<bool>,

    #[validate(custom(function = "shared::validation::validate_points"))]
    pub points: Option<i32>,

    #[validate(custom(function = "shared::validation::validate_points"))]
    pub score: Option<i32>,
}

/// Query parameters for the admin user list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub role: Option<Role>,
}
