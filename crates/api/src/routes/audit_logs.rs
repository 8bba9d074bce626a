//! Audit log routes (admin, read-only).
//!
//! The audit trail is append-only: there are no mutation endpoints here
//! by design of the data, not as an omission.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{AuditLog, ListAuditLogsQuery};
use persistence::repositories::AuditLogRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Response for paged audit log listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditLogsResponse {
    pub logs: Vec<AuditLog>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// List audit logs, newest first.
///
/// GET /api/v1/admin/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<Json<ListAuditLogsResponse>, ApiError> {
    let repo = AuditLogRepository::new(state.pool.clone());
    let (logs, total) = repo.list(&query).await?;

    Ok(Json(ListAuditLogsResponse {
        logs,
        total,
        page: query.page.unwrap_or(1).max(1),
        per_page: query.per_page.unwrap_or(50).clamp(1, 100),
    }))
}

/// Get a single audit log entry.
///
/// GET /api/v1/admin/audit-logs/:id
pub async fn get_audit_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AuditLog>, ApiError> {
    let repo = AuditLogRepository::new(state.pool.clone());
    let log = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Audit log entry not found".to_string()))?;
    Ok(Json(log))
}
