//! User repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{SessionEntity, UserEntity};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, password_hash, display_name, points, score, role, \
                            is_active, created_at, updated_at, last_login_at";

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Look up just the role of an active user, for authorization gates.
    pub async fn find_role(&self, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_role");
        let row: Option<(String,)> =
            sqlx::query_as("SELECT role FROM users WHERE id = $1 AND is_active = true")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        timer.record();
        Ok(row.and_then(|(role,)| role.parse().ok()))
    }

    /// Create a new user account with the default hunter role.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List users with pagination and an optional role filter.
    pub async fn list(
        &self,
        page: u32,
        per_page: u32,
        role: Option<Role>,
    ) -> Result<(Vec<UserEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let offset = ((page.max(1) - 1) * per_page) as i64;

        let (total, entities) = match role {
            Some(role) => {
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
                        .bind(role.as_str())
                        .fetch_one(&self.pool)
                        .await?;
                let entities = sqlx::query_as::<_, UserEntity>(&format!(
                    r#"
                    SELECT {}
                    FROM users
                    WHERE role = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                    USER_COLUMNS
                ))
                .bind(role.as_str())
                .bind(per_page as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (total, entities)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await?;
                let entities = sqlx::query_as::<_, UserEntity>(&format!(
                    r#"
                    SELECT {}
                    FROM users
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                    USER_COLUMNS
                ))
                .bind(per_page as i64)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (total, entities)
            }
        };

        timer.record();
        Ok((entities, total))
    }

    /// Update a user's own display name.
    pub async fn update_display_name(
        &self,
        id: Uuid,
        display_name: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_display_name");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET display_name = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(display_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Admin update: role, active flag, and explicit points/score values.
    ///
    /// The points column here is the only balance mutation outside order
    /// settlement; callers audit it with before/after snapshots.
    pub async fn admin_update(
        &self,
        id: Uuid,
        role: Option<Role>,
        is_active: Option<bool>,
        points: Option<i32>,
        score: Option<i32>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("admin_update_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET role = COALESCE($1, role),
                is_active = COALESCE($2, is_active),
                points = COALESCE($3, points),
                score = COALESCE($4, score),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(role.map(|r| r.as_str()))
        .bind(is_active)
        .bind(points)
        .bind(score)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a user account.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Update user's last login timestamp.
    pub async fn update_last_login(
        &self,
        user_id: Uuid,
        last_login_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_last_login");
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(last_login_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Create a new user session.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user_session");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            INSERT INTO user_sessions (user_id, token_hash, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, refresh_token_hash, expires_at, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a session by its refresh token hash.
    pub async fn find_session_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
        user_id: Uuid,
    ) -> Result<Option<SessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_session_by_refresh_hash");
        let result = sqlx::query_as::<_, SessionEntity>(
            r#"
            SELECT id, user_id, token_hash, refresh_token_hash, expires_at, created_at, last_used_at
            FROM user_sessions
            WHERE refresh_token_hash = $1 AND user_id = $2
            "#,
        )
        .bind(refresh_token_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Rotate a session's token hashes after a refresh.
    pub async fn rotate_session(
        &self,
        session_id: Uuid,
        token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("rotate_session");
        sqlx::query(
            r#"
            UPDATE user_sessions
            SET token_hash = $1, refresh_token_hash = $2, expires_at = $3, last_used_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(token_hash)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Delete a session by ID.
    pub async fn delete_session(&self, session_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("delete_session");
        sqlx::query("DELETE FROM user_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// Delete a session by its refresh token hash (logout).
    pub async fn delete_session_by_refresh_hash(
        &self,
        refresh_token_hash: &str,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_session_by_refresh_hash");
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE refresh_token_hash = $1 AND user_id = $2")
                .bind(refresh_token_hash)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user (logout everywhere).
    pub async fn delete_all_sessions(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("delete_all_sessions");
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() as i64)
    }
}

#[cfg(test)]
mod tests {
    // Note: UserRepository tests require a database connection and are
    // covered by integration tests.
}
