//! HTTP route handlers.

pub mod applications;
pub mod audit_logs;
pub mod auth;
pub mod criticalities;
pub mod health;
pub mod order_statuses;
pub mod orders;
pub mod reports;
pub mod rewards;
pub mod users;
