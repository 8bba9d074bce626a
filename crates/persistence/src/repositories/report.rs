//! Report repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::ReportStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ReportEntity;
use crate::metrics::QueryTimer;

const REPORT_COLUMNS: &str = "id, title, description, application_id, criticality_id, \
                              reporter_id, status, created_at, updated_at";

/// Filters for the report list query.
///
/// `reporter_id` scopes hunters to their own reports; `cursor` is the
/// decoded keyset position for pagination.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub reporter_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
    pub status: Option<ReportStatus>,
    pub cursor: Option<(DateTime<Utc>, Uuid)>,
}

/// Helper struct for building dynamic WHERE clauses from report filters.
struct ReportFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl ReportFilterBuilder {
    fn build(filter: &ReportFilter) -> Self {
        let mut conditions = Vec::new();
        let mut param_count = 0;

        if filter.reporter_id.is_some() {
            param_count += 1;
            conditions.push(format!("reporter_id = ${}", param_count));
        }

        if filter.application_id.is_some() {
            param_count += 1;
            conditions.push(format!("application_id = ${}", param_count));
        }

        if filter.status.is_some() {
            param_count += 1;
            conditions.push(format!("status = ${}", param_count));
        }

        if filter.cursor.is_some() {
            conditions.push(format!(
                "(created_at, id) < (${}, ${})",
                param_count + 1,
                param_count + 2
            ));
            param_count += 2;
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

macro_rules! bind_report_filters {
    ($builder:expr, $filter:expr) => {{
        let mut b = $builder;
        if let Some(reporter_id) = $filter.reporter_id {
            b = b.bind(reporter_id);
        }
        if let Some(application_id) = $filter.application_id {
            b = b.bind(application_id);
        }
        if let Some(status) = $filter.status {
            b = b.bind(status.as_str());
        }
        if let Some((created_at, id)) = $filter.cursor {
            b = b.bind(created_at).bind(id);
        }
        b
    }};
}

/// Repository for report-related database operations.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Creates a new ReportRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// File a new report with status pending.
    pub async fn create(
        &self,
        title: &str,
        description: &str,
        application_id: Uuid,
        criticality_id: Uuid,
        reporter_id: Uuid,
    ) -> Result<ReportEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_report");
        let result = sqlx::query_as::<_, ReportEntity>(&format!(
            r#"
            INSERT INTO reports (title, description, application_id, criticality_id, reporter_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(title)
        .bind(description)
        .bind(application_id)
        .bind(criticality_id)
        .bind(reporter_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_report_by_id");
        let result = sqlx::query_as::<_, ReportEntity>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List reports newest first with keyset pagination.
    ///
    /// Fetches `limit + 1` rows; the caller uses the extra row to decide
    /// whether a next-page cursor exists.
    pub async fn list(
        &self,
        filter: &ReportFilter,
        limit: u32,
    ) -> Result<Vec<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_reports");
        let builder = ReportFilterBuilder::build(filter);

        let query = format!(
            r#"
            SELECT {}
            FROM reports
            WHERE {}
            ORDER BY created_at DESC, id DESC
            LIMIT ${}
            "#,
            REPORT_COLUMNS,
            builder.where_clause(),
            builder.param_count() + 1
        );

        let list_builder = sqlx::query_as::<_, ReportEntity>(&query);
        let list_builder = bind_report_filters!(list_builder, filter);
        let result = list_builder
            .bind((limit + 1) as i64)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Update a report's review status.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ReportStatus,
    ) -> Result<Option<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_report_status");
        let result = sqlx::query_as::<_, ReportEntity>(&format!(
            r#"
            UPDATE reports
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a report.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_report");
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builder_no_filters() {
        let filter = ReportFilter::default();
        let builder = ReportFilterBuilder::build(&filter);
        assert_eq!(builder.where_clause(), "TRUE");
        assert_eq!(builder.param_count(), 0);
    }

    #[test]
    fn test_filter_builder_cursor_uses_two_params() {
        let filter = ReportFilter {
            reporter_id: Some(Uuid::new_v4()),
            application_id: None,
            status: None,
            cursor: Some((Utc::now(), Uuid::new_v4())),
        };
        let builder = ReportFilterBuilder::build(&filter);
        assert_eq!(
            builder.where_clause(),
            "reporter_id = $1 AND (created_at, id) < ($2, $3)"
        );
        assert_eq!(builder.param_count(), 3);
    }

    #[test]
    fn test_filter_builder_all_filters() {
        let filter = ReportFilter {
            reporter_id: Some(Uuid::new_v4()),
            application_id: Some(Uuid::new_v4()),
            status: Some(ReportStatus::Accepted),
            cursor: Some((Utc::now(), Uuid::new_v4())),
        };
        let builder = ReportFilterBuilder::build(&filter);
        assert_eq!(builder.param_count(), 5);
        assert!(builder.where_clause().contains("application_id = $2"));
        assert!(builder.where_clause().contains("status = $3"));
    }
}
