//! Reward repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::RewardEntity;
use crate::metrics::QueryTimer;

const REWARD_COLUMNS: &str =
    "id, name, description, points_cost, quantity, available, created_at, updated_at";

/// Repository for reward-catalogue database operations.
#[derive(Clone)]
pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    /// Creates a new RewardRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new reward.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        points_cost: i32,
        quantity: i32,
        available: bool,
    ) -> Result<RewardEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_reward");
        let result = sqlx::query_as::<_, RewardEntity>(&format!(
            r#"
            INSERT INTO rewards (name, description, points_cost, quantity, available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            REWARD_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(points_cost)
        .bind(quantity)
        .bind(available)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a reward by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RewardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reward_by_id");
        let result = sqlx::query_as::<_, RewardEntity>(&format!(
            "SELECT {} FROM rewards WHERE id = $1",
            REWARD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List rewards, optionally only purchasable ones.
    pub async fn list(&self, available_only: bool) -> Result<Vec<RewardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_rewards");
        let query = if available_only {
            format!(
                "SELECT {} FROM rewards WHERE available = true AND quantity > 0 ORDER BY points_cost",
                REWARD_COLUMNS
            )
        } else {
            format!("SELECT {} FROM rewards ORDER BY points_cost", REWARD_COLUMNS)
        };
        let result = sqlx::query_as::<_, RewardEntity>(&query)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Update a reward (partial update via COALESCE).
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        points_cost: Option<i32>,
        quantity: Option<i32>,
        available: Option<bool>,
    ) -> Result<Option<RewardEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_reward");
        let result = sqlx::query_as::<_, RewardEntity>(&format!(
            r#"
            UPDATE rewards
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                points_cost = COALESCE($3, points_cost),
                quantity = COALESCE($4, quantity),
                available = COALESCE($5, available),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            REWARD_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(points_cost)
        .bind(quantity)
        .bind(available)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a reward.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_reward");
        let result = sqlx::query("DELETE FROM rewards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Check whether any order references this reward.
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("reward_is_referenced");
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE reward_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        timer.record();
        Ok(referenced)
    }
}
