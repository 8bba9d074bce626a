//! Audit recording for non-transactional mutations.
//!
//! Order settlement writes its audit row inside the settlement
//! transaction; every other CRUD mutation goes through this service,
//! which snapshots the entity and inserts the row without blocking the
//! request.

use domain::models::CreateAuditLogInput;
use persistence::repositories::AuditLogRepository;
use sqlx::PgPool;

/// Fire-and-forget audit writer.
#[derive(Clone)]
pub struct AuditService {
    repo: AuditLogRepository,
}

impl AuditService {
    /// Creates a new AuditService backed by the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: AuditLogRepository::new(pool),
        }
    }

    /// Record an audit entry asynchronously.
    pub fn record(&self, input: CreateAuditLogInput) {
        self.repo.insert_async(input);
    }
}
