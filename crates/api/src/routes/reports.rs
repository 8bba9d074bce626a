//! Vulnerability report routes.
//!
//! Hunters file reports and see their own; devs and admins see all and
//! decide on them.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::report::{
    CreateReportRequest, ListReportsQuery, UpdateReportStatusRequest,
};
use domain::models::{Report, Role};
use domain::services::AuditEntryBuilder;
use persistence::repositories::report::ReportFilter;
use persistence::repositories::{
    ApplicationRepository, CriticalityRepository, ReportRepository, UserRepository,
};
use serde::Serialize;
use shared::pagination::{decode_cursor, encode_cursor};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_report_filed;
use crate::services::AuditService;

const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 100;

/// Response for cursor-paginated report listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsResponse {
    pub reports: Vec<Report>,
    pub next_cursor: Option<String>,
}

/// Resolve the caller's role, treating a missing account as unauthorized.
async fn caller_role(state: &AppState, user_id: Uuid) -> Result<Role, ApiError> {
    UserRepository::new(state.pool.clone())
        .find_role(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User account is not active".to_string()))
}

/// File a new report.
///
/// POST /api/v1/reports
pub async fn create_report(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    request.validate()?;

    let application = ApplicationRepository::new(state.pool.clone())
        .find_by_id(request.application_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    if !application.active {
        return Err(ApiError::Validation(
            "Application no longer accepts reports".to_string(),
        ));
    }

    CriticalityRepository::new(state.pool.clone())
        .find_by_id(request.criticality_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Criticality not found".to_string()))?;

    let repo = ReportRepository::new(state.pool.clone());
    let entity = repo
        .create(
            &request.title,
            &request.description,
            request.application_id,
            request.criticality_id,
            user_auth.user_id,
        )
        .await?;

    let report: Report = entity.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::create("report", user_auth.user_id)
            .entity_id(report.id)
            .new_state(&report)
            .build(),
    );
    record_report_filed();

    info!(
        report_id = %report.id,
        application_id = %report.application_id,
        reporter_id = %user_auth.user_id,
        "Report filed"
    );

    Ok((StatusCode::CREATED, Json(report)))
}

/// List reports with keyset pagination.
///
/// GET /api/v1/reports
///
/// Hunters see their own reports; devs and admins see everything.
pub async fn list_reports(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<ListReportsResponse>, ApiError> {
    let role = caller_role(&state, user_auth.user_id).await?;

    let cursor = match query.cursor.as_deref() {
        Some(raw) => Some(
            decode_cursor(raw)
                .map_err(|e| ApiError::Validation(format!("Invalid cursor: {}", e)))?,
        ),
        None => None,
    };

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let filter = ReportFilter {
        reporter_id: (!role.at_least(Role::Dev)).then_some(user_auth.user_id),
        application_id: query.application_id,
        status: query.status,
        cursor,
    };

    let repo = ReportRepository::new(state.pool.clone());
    let mut entities = repo.list(&filter, limit).await?;

    // The repository fetches one extra row to detect a next page
    let next_cursor = if entities.len() > limit as usize {
        entities.truncate(limit as usize);
        entities
            .last()
            .map(|last| encode_cursor(last.created_at, last.id))
    } else {
        None
    };

    Ok(Json(ListReportsResponse {
        reports: entities.into_iter().map(Into::into).collect(),
        next_cursor,
    }))
}

/// Get a single report.
///
/// GET /api/v1/reports/:id
///
/// Visible to its reporter and to devs/admins.
pub async fn get_report(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, ApiError> {
    let repo = ReportRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    if entity.reporter_id != user_auth.user_id {
        let role = caller_role(&state, user_auth.user_id).await?;
        if !role.at_least(Role::Dev) {
            return Err(ApiError::Forbidden(
                "You can only view your own reports".to_string(),
            ));
        }
    }

    Ok(Json(entity.into()))
}

/// Decide on a report (dev).
///
/// PUT /api/v1/reports/:id/status
pub async fn update_report_status(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReportStatusRequest>,
) -> Result<Json<Report>, ApiError> {
    let repo = ReportRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    let after = repo
        .update_status(id, request.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    let before: Report = before.into();
    let after: Report = after.into();

    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::update("report", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .new_state(&after)
            .build(),
    );

    info!(
        report_id = %id,
        status = %after.status.as_str(),
        actor_id = %user_auth.user_id,
        "Report status updated"
    );

    Ok(Json(after))
}

/// Delete a report (admin).
///
/// DELETE /api/v1/reports/:id
pub async fn delete_report(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ReportRepository::new(state.pool.clone());

    let before = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".to_string()))?;

    repo.delete(id).await?;

    let before: Report = before.into();
    AuditService::new(state.pool.clone()).record(
        AuditEntryBuilder::delete("report", user_auth.user_id)
            .entity_id(id)
            .old_state(&before)
            .build(),
    );

    info!(report_id = %id, actor_id = %user_auth.user_id, "Report deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::ReportStatus;

    #[test]
    fn test_update_status_request_deserializes() {
        let request: UpdateReportStatusRequest =
            serde_json::from_str(r#"{"status": "accepted"}"#).unwrap();
        assert_eq!(request.status, ReportStatus::Accepted);
    }

    #[test]
    fn test_update_status_request_rejects_unknown() {
        let result: Result<UpdateReportStatusRequest, _> =
            serde_json::from_str(r#"{"status": "escalated"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_response_serializes_next_cursor() {
        let response = ListReportsResponse {
            reports: vec![],
            next_cursor: Some("abc".to_string()),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("nextCursor"));
    }
}
