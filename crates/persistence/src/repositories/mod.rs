//! Repository implementations.

pub mod application;
pub mod audit_log;
pub mod criticality;
pub mod order;
pub mod order_status;
pub mod report;
pub mod reward;
pub mod user;

pub use application::ApplicationRepository;
pub use audit_log::AuditLogRepository;
pub use criticality::CriticalityRepository;
pub use order::{OrderError, OrderRepository, SettledOrder};
pub use order_status::OrderStatusRepository;
pub use report::ReportRepository;
pub use reward::RewardRepository;
pub use user::UserRepository;
