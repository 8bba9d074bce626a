//! Domain layer for the bounty platform backend.
//!
//! This crate contains:
//! - Domain models (User, Application, Report, Criticality, Reward, Order)
//! - Request payload types with validation
//! - The audit entry builder

pub mod models;
pub mod services;
