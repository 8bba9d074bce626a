//! Audit log repository for database operations.
//!
//! Audit rows are append-only; this repository exposes inserts and reads
//! but no update or delete.

use domain::models::{AuditLog, CreateAuditLogInput, ListAuditLogsQuery};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::AuditLogEntity;
use crate::metrics::QueryTimer;

const INSERT_SQL: &str = r#"
    INSERT INTO audit_logs (entity_type, entity_id, action, old_value, new_value, actor_id)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, entity_type, entity_id, action, old_value, new_value, actor_id, created_at
"#;

const SELECT_COLUMNS: &str =
    "id, entity_type, entity_id, action, old_value, new_value, actor_id, created_at";

/// Helper struct for building dynamic WHERE clauses from audit log filters.
struct AuditLogFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl AuditLogFilterBuilder {
    fn build(query: &ListAuditLogsQuery) -> Self {
        let mut conditions = Vec::new();
        let mut param_count = 0;

        if query.entity_type.is_some() {
            param_count += 1;
            conditions.push(format!("entity_type = ${}", param_count));
        }

        if query.action.is_some() {
            param_count += 1;
            conditions.push(format!("action = ${}", param_count));
        }

        if query.actor_id.is_some() {
            param_count += 1;
            conditions.push(format!("actor_id = ${}", param_count));
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

/// Macro to bind audit filter parameters to a SQLx builder, avoiding
/// duplicated Option plumbing between the count and list queries.
macro_rules! bind_audit_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref entity_type) = $query.entity_type {
            b = b.bind(entity_type);
        }
        if let Some(action) = $query.action {
            b = b.bind(action.as_str());
        }
        if let Some(actor_id) = $query.actor_id {
            b = b.bind(actor_id);
        }
        b
    }};
}

/// Repository for audit log database operations.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new audit log entry.
    pub async fn insert(&self, input: CreateAuditLogInput) -> Result<AuditLog, sqlx::Error> {
        let timer = QueryTimer::new("insert_audit_log");
        let entity = sqlx::query_as::<_, AuditLogEntity>(INSERT_SQL)
            .bind(&input.entity_type)
            .bind(&input.entity_id)
            .bind(input.action.as_str())
            .bind(&input.old_value)
            .bind(&input.new_value)
            .bind(input.actor_id)
            .fetch_one(&self.pool)
            .await?;
        timer.record();
        Ok(entity.into())
    }

    /// Insert an audit log entry inside an open transaction.
    ///
    /// Used by the order settlement flow so the audit row commits or rolls
    /// back together with the balance mutations it describes.
    pub async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: CreateAuditLogInput,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (entity_type, entity_id, action, old_value, new_value, actor_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&input.entity_type)
        .bind(&input.entity_id)
        .bind(input.action.as_str())
        .bind(&input.old_value)
        .bind(&input.new_value)
        .bind(input.actor_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Insert an audit log entry asynchronously (fire and forget).
    ///
    /// Uses tokio::spawn to avoid blocking the request for mutations whose
    /// audit write does not need to share the mutation's transaction.
    pub fn insert_async(&self, input: CreateAuditLogInput) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let repo = AuditLogRepository::new(pool);
            if let Err(e) = repo.insert(input).await {
                tracing::error!("Failed to insert audit log: {}", e);
            }
        });
    }

    /// Find an audit log entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditLog>, sqlx::Error> {
        let timer = QueryTimer::new("find_audit_log_by_id");
        let entity = sqlx::query_as::<_, AuditLogEntity>(&format!(
            "SELECT {} FROM audit_logs WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();
        Ok(entity.map(Into::into))
    }

    /// List audit logs with pagination and filtering, newest first.
    pub async fn list(
        &self,
        query: &ListAuditLogsQuery,
    ) -> Result<(Vec<AuditLog>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_audit_logs");
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let filter = AuditLogFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM audit_logs WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_audit_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT {}
            FROM audit_logs
            WHERE {}
            ORDER BY created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            SELECT_COLUMNS,
            where_clause,
            param_count + 1,
            param_count + 2
        );

        let list_builder = sqlx::query_as::<_, AuditLogEntity>(&list_query);
        let list_builder = bind_audit_filters!(list_builder, query);
        let entities = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        timer.record();
        Ok((entities.into_iter().map(Into::into).collect(), total))
    }
}
