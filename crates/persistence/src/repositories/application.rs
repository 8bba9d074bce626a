//! Application repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ApplicationEntity;
use crate::metrics::QueryTimer;

const APP_COLUMNS: &str = "id, name, description, url, logo_url, active, created_at, updated_at";

/// Repository for application-related database operations.
#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    /// Creates a new ApplicationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new application.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        url: Option<&str>,
        logo_url: Option<&str>,
        active: bool,
    ) -> Result<ApplicationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_application");
        let result = sqlx::query_as::<_, ApplicationEntity>(&format!(
            r#"
            INSERT INTO applications (name, description, url, logo_url, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            APP_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(url)
        .bind(logo_url)
        .bind(active)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an application by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_application_by_id");
        let result = sqlx::query_as::<_, ApplicationEntity>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List applications, optionally restricted to active ones.
    pub async fn list(&self, active_only: bool) -> Result<Vec<ApplicationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_applications");
        let query = if active_only {
            format!(
                "SELECT {} FROM applications WHERE active = true ORDER BY name",
                APP_COLUMNS
            )
        } else {
            format!("SELECT {} FROM applications ORDER BY name", APP_COLUMNS)
        };
        let result = sqlx::query_as::<_, ApplicationEntity>(&query)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Update an application (partial update via COALESCE).
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        url: Option<&str>,
        logo_url: Option<&str>,
        active: Option<bool>,
    ) -> Result<Option<ApplicationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_application");
        let result = sqlx::query_as::<_, ApplicationEntity>(&format!(
            r#"
            UPDATE applications
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                url = COALESCE($3, url),
                logo_url = COALESCE($4, logo_url),
                active = COALESCE($5, active),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            APP_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(url)
        .bind(logo_url)
        .bind(active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an application.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_application");
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Check whether any report references this application.
    pub async fn is_referenced(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("application_is_referenced");
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reports WHERE application_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        timer.record();
        Ok(referenced)
    }
}
