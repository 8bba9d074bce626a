//! Order status repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::OrderStatusEntity;
use crate::metrics::QueryTimer;

/// Repository for the order-status catalogue.
#[derive(Clone)]
pub struct OrderStatusRepository {
    pool: PgPool,
}

impl OrderStatusRepository {
    /// Creates a new OrderStatusRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new status.
    pub async fn create(&self, name: &str) -> Result<OrderStatusEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_order_status");
        let result = sqlx::query_as::<_, OrderStatusEntity>(
            r#"
            INSERT INTO order_statuses (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a status by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderStatusEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_order_status_by_id");
        let result = sqlx::query_as::<_, OrderStatusEntity>(
            "SELECT id, name FROM order_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a status by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<OrderStatusEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_order_status_by_name");
        let result = sqlx::query_as::<_, OrderStatusEntity>(
            "SELECT id, name FROM order_statuses WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all statuses.
    pub async fn list(&self) -> Result<Vec<OrderStatusEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_order_statuses");
        let result =
            sqlx::query_as::<_, OrderStatusEntity>("SELECT id, name FROM order_statuses ORDER BY name")
                .fetch_all(&self.pool)
                .await;
        timer.record();
        result
    }

    /// Check whether any order references this status.
    ///
    /// A referenced status must not be deleted; the FK RESTRICT constraint
    /// is the backstop for the race between check and delete.
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("order_status_is_referenced");
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE status_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        timer.record();
        Ok(referenced)
    }

    /// Delete a status.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_order_status");
        let result = sqlx::query("DELETE FROM order_statuses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
