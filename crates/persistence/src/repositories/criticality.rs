//! Criticality repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CriticalityEntity;
use crate::metrics::QueryTimer;

const CRIT_COLUMNS: &str = "id, name, low, medium, high, critical, created_at, updated_at";

/// Repository for criticality-related database operations.
#[derive(Clone)]
pub struct CriticalityRepository {
    pool: PgPool,
}

impl CriticalityRepository {
    /// Creates a new CriticalityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new criticality tier.
    pub async fn create(
        &self,
        name: &str,
        low: i32,
        medium: i32,
        high: i32,
        critical: i32,
    ) -> Result<CriticalityEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_criticality");
        let result = sqlx::query_as::<_, CriticalityEntity>(&format!(
            r#"
            INSERT INTO criticalities (name, low, medium, high, critical)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CRIT_COLUMNS
        ))
        .bind(name)
        .bind(low)
        .bind(medium)
        .bind(high)
        .bind(critical)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a criticality by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CriticalityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_criticality_by_id");
        let result = sqlx::query_as::<_, CriticalityEntity>(&format!(
            "SELECT {} FROM criticalities WHERE id = $1",
            CRIT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all criticality tiers.
    pub async fn list(&self) -> Result<Vec<CriticalityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_criticalities");
        let result = sqlx::query_as::<_, CriticalityEntity>(&format!(
            "SELECT {} FROM criticalities ORDER BY name",
            CRIT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a criticality tier. The thresholds always arrive as a
    /// complete, already-validated set.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        low: i32,
        medium: i32,
        high: i32,
        critical: i32,
    ) -> Result<Option<CriticalityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_criticality");
        let result = sqlx::query_as::<_, CriticalityEntity>(&format!(
            r#"
            UPDATE criticalities
            SET name = COALESCE($1, name),
                low = $2, medium = $3, high = $4, critical = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            CRIT_COLUMNS
        ))
        .bind(name)
        .bind(low)
        .bind(medium)
        .bind(high)
        .bind(critical)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a criticality tier.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_criticality");
        let result = sqlx::query("DELETE FROM criticalities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Check whether any report references this criticality.
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("criticality_is_referenced");
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reports WHERE criticality_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        timer.record();
        Ok(referenced)
    }
}
