//! Order repository: settlement, confirmation, and cancellation.
//!
//! All multi-step balance mutations run inside a single transaction; the
//! database's isolation is the only concurrency control. There is no row
//! locking and no retry-on-conflict logic; the CHECK constraints on
//! user points and reward quantity are the final backstop against races.

use domain::models::order::{STATUS_CONFIRMED, STATUS_PENDING};
use domain::models::{AuditAction, CreateAuditLogInput};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{OrderDetailsEntity, OrderEntity};
use crate::metrics::QueryTimer;
use crate::repositories::audit_log::AuditLogRepository;

/// Errors surfaced by order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found")]
    OrderNotFound,

    #[error("Reward not found")]
    RewardNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Reward is not available")]
    RewardUnavailable,

    #[error("Reward is out of stock")]
    OutOfStock,

    #[error("Insufficient points: balance {balance}, required {required}")]
    InsufficientPoints { balance: i32, required: i32 },

    #[error("Order status '{0}' is not configured")]
    StatusMissing(&'static str),

    #[error("Invalid status transition from '{0}'")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a successful settlement.
#[derive(Debug, Clone)]
pub struct SettledOrder {
    pub order: OrderEntity,
    /// The user's point balance after the deduction.
    pub remaining_points: i32,
    /// Units of the reward left in stock after the decrement.
    pub remaining_quantity: i32,
}

/// Row for the balance/stock checks inside the settlement transaction.
#[derive(Debug, sqlx::FromRow)]
struct RewardRow {
    points_cost: i32,
    quantity: i32,
    available: bool,
}

/// Order joined with its status name and reward cost, as loaded at the
/// start of the confirmation/cancellation transactions.
#[derive(Debug, sqlx::FromRow)]
struct OrderStateRow {
    user_id: Uuid,
    reward_id: Uuid,
    status_name: String,
    points_cost: i32,
}

/// Repository for order-related database operations.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Creates a new OrderRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Settle a new order for `user_id` against `reward_id`.
    ///
    /// Atomically: checks availability, stock, and balance; inserts the
    /// order with status PENDING; decrements the user's points and the
    /// reward's quantity; writes the audit row. Any failure rolls the
    /// whole sequence back.
    pub async fn settle(&self, user_id: Uuid, reward_id: Uuid) -> Result<SettledOrder, OrderError> {
        let timer = QueryTimer::new("settle_order");
        let mut tx = self.pool.begin().await?;

        let reward: Option<RewardRow> = sqlx::query_as(
            r#"
            SELECT points_cost, quantity, available
            FROM rewards
            WHERE id = $1
            "#,
        )
        .bind(reward_id)
        .fetch_optional(&mut *tx)
        .await?;

        let reward = reward.ok_or(OrderError::RewardNotFound)?;

        if !reward.available {
            return Err(OrderError::RewardUnavailable);
        }
        if reward.quantity == 0 {
            return Err(OrderError::OutOfStock);
        }

        let balance: Option<(i32,)> = sqlx::query_as("SELECT points FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let (balance,) = balance.ok_or(OrderError::UserNotFound)?;

        if balance < reward.points_cost {
            return Err(OrderError::InsufficientPoints {
                balance,
                required: reward.points_cost,
            });
        }

        let pending_id = status_id_by_name(&mut tx, STATUS_PENDING).await?;

        let order = sqlx::query_as::<_, OrderEntity>(
            r#"
            INSERT INTO orders (user_id, reward_id, status_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, reward_id, status_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(reward_id)
        .bind(pending_id)
        .fetch_one(&mut *tx)
        .await?;

        let (remaining_points,): (i32,) = sqlx::query_as(
            r#"
            UPDATE users
            SET points = points - $1, updated_at = NOW()
            WHERE id = $2
            RETURNING points
            "#,
        )
        .bind(reward.points_cost)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let (remaining_quantity,): (i32,) = sqlx::query_as(
            r#"
            UPDATE rewards
            SET quantity = quantity - 1, updated_at = NOW()
            WHERE id = $1
            RETURNING quantity
            "#,
        )
        .bind(reward_id)
        .fetch_one(&mut *tx)
        .await?;

        AuditLogRepository::insert_in_tx(
            &mut tx,
            CreateAuditLogInput {
                entity_type: "order".to_string(),
                entity_id: Some(order.id.to_string()),
                action: AuditAction::Create,
                old_value: Some(json!({
                    "userPoints": balance,
                    "rewardQuantity": reward.quantity,
                })),
                new_value: Some(json!({
                    "rewardId": reward_id,
                    "status": STATUS_PENDING,
                    "userPoints": remaining_points,
                    "rewardQuantity": remaining_quantity,
                })),
                actor_id: Some(user_id),
            },
        )
        .await?;

        tx.commit().await?;
        timer.record();

        Ok(SettledOrder {
            order,
            remaining_points,
            remaining_quantity,
        })
    }

    /// Confirm a pending order.
    ///
    /// PENDING -> CONFIRMED is the only legal transition; any other
    /// current status is rejected.
    pub async fn confirm(&self, order_id: Uuid, actor_id: Uuid) -> Result<OrderEntity, OrderError> {
        let timer = QueryTimer::new("confirm_order");
        let mut tx = self.pool.begin().await?;

        let state = load_order_state(&mut tx, order_id).await?;

        if state.status_name != STATUS_PENDING {
            return Err(OrderError::InvalidTransition(state.status_name));
        }

        let confirmed_id = status_id_by_name(&mut tx, STATUS_CONFIRMED).await?;

        let order = sqlx::query_as::<_, OrderEntity>(
            r#"
            UPDATE orders
            SET status_id = $1
            WHERE id = $2
            RETURNING id, user_id, reward_id, status_id, created_at
            "#,
        )
        .bind(confirmed_id)
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        AuditLogRepository::insert_in_tx(
            &mut tx,
            CreateAuditLogInput {
                entity_type: "order".to_string(),
                entity_id: Some(order_id.to_string()),
                action: AuditAction::Update,
                old_value: Some(json!({"status": STATUS_PENDING})),
                new_value: Some(json!({"status": STATUS_CONFIRMED})),
                actor_id: Some(actor_id),
            },
        )
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(order)
    }

    /// Delete an order, reversing its settlement effects if it was
    /// CONFIRMED.
    ///
    /// A confirmed order restores the user's points and the reward's
    /// quantity before the row is removed; a pending order is simply
    /// deleted. Both paths write a deletion audit row in the same
    /// transaction.
    pub async fn cancel(&self, order_id: Uuid, actor_id: Uuid) -> Result<(), OrderError> {
        let timer = QueryTimer::new("cancel_order");
        let mut tx = self.pool.begin().await?;

        let state = load_order_state(&mut tx, order_id).await?;
        let reverses = state.status_name == STATUS_CONFIRMED;

        if reverses {
            sqlx::query(
                r#"
                UPDATE users
                SET points = points + $1, updated_at = NOW()
                WHERE id = $2
                "#,
            )
            .bind(state.points_cost)
            .bind(state.user_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE rewards
                SET quantity = quantity + 1, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(state.reward_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        AuditLogRepository::insert_in_tx(
            &mut tx,
            CreateAuditLogInput {
                entity_type: "order".to_string(),
                entity_id: Some(order_id.to_string()),
                action: AuditAction::Delete,
                old_value: Some(json!({
                    "userId": state.user_id,
                    "rewardId": state.reward_id,
                    "status": state.status_name,
                    "reversed": reverses,
                })),
                new_value: None,
                actor_id: Some(actor_id),
            },
        )
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_order_by_id");
        let result = sqlx::query_as::<_, OrderEntity>(
            r#"
            SELECT id, user_id, reward_id, status_id, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a user's orders joined with reward and status names.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<OrderDetailsEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_orders_for_user");
        let offset = ((page.max(1) - 1) * per_page) as i64;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let entities = sqlx::query_as::<_, OrderDetailsEntity>(
            r#"
            SELECT o.id, o.user_id, o.reward_id, r.name AS reward_name, r.points_cost,
                   o.status_id, s.name AS status_name, o.created_at
            FROM orders o
            JOIN rewards r ON r.id = o.reward_id
            JOIN order_statuses s ON s.id = o.status_id
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        timer.record();
        Ok((entities, total))
    }
}

/// Resolve a status ID by its canonical name inside a transaction.
async fn status_id_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &'static str,
) -> Result<Uuid, OrderError> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM order_statuses WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

    row.map(|(id,)| id).ok_or(OrderError::StatusMissing(name))
}

/// Load an order with its status name and reward cost inside a transaction.
async fn load_order_state(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<OrderStateRow, OrderError> {
    let state: Option<OrderStateRow> = sqlx::query_as(
        r#"
        SELECT o.user_id, o.reward_id, s.name AS status_name, r.points_cost
        FROM orders o
        JOIN order_statuses s ON s.id = o.status_id
        JOIN rewards r ON r.id = o.reward_id
        WHERE o.id = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(&mut **tx)
    .await?;

    state.ok_or(OrderError::OrderNotFound)
}
