//! Integration tests for the audit trail.

mod common;

use axum::http::Method;
use common::{
    create_reward, create_test_app, create_test_pool, parse_body, register_user,
    register_user_with_role, send_json, TestUser,
};
use domain::models::Role;
use serde_json::json;
use std::time::Duration;

/// Audit rows for plain CRUD are written fire-and-forget; give the spawned
/// insert a moment to land before asserting.
async fn settle_async_audit() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_audit_listing_requires_admin() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let hunter = register_user(&app, &TestUser::new()).await;

    let response = send_json(
        &app,
        Method::GET,
        "/api/v1/admin/audit-logs",
        Some(&hunter.access_token),
        None,
    )
    .await;

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_reward_update_writes_snapshots() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin = register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let reward_id = create_reward(&app, &admin, 100, 7, true).await;

    let update = send_json(
        &app,
        Method::PUT,
        &format!("/api/v1/rewards/{}", reward_id),
        Some(&admin.access_token),
        Some(json!({"quantity": 3})),
    )
    .await;
    assert_eq!(update.status(), 200);

    settle_async_audit().await;

    let row: (serde_json::Value, serde_json::Value) = sqlx::query_as(
        "SELECT old_value, new_value FROM audit_logs \
         WHERE entity_type = 'reward' AND action = 'update' AND entity_id = $1 \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(reward_id.to_string())
    .fetch_one(&pool)
    .await
    .expect("audit row for reward update");

    assert_eq!(row.0["quantity"], 7);
    assert_eq!(row.1["quantity"], 3);
}

#[tokio::test]
async fn test_admin_can_filter_by_entity_type() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin = register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    create_reward(&app, &admin, 10, 1, true).await;

    settle_async_audit().await;

    let response = send_json(
        &app,
        Method::GET,
        "/api/v1/admin/audit-logs?entityType=reward&action=create",
        Some(&admin.access_token),
        None,
    )
    .await;

    assert_eq!(response.status(), 200);
    let body = parse_body(response).await;
    assert!(body["total"].as_i64().unwrap() >= 1);
    for log in body["logs"].as_array().unwrap() {
        assert_eq!(log["entityType"], "reward");
        assert_eq!(log["action"], "create");
    }
}

#[tokio::test]
async fn test_actor_is_recorded() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin = register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let reward_id = create_reward(&app, &admin, 10, 1, true).await;

    settle_async_audit().await;

    let actor: Option<uuid::Uuid> = sqlx::query_scalar(
        "SELECT actor_id FROM audit_logs \
         WHERE entity_type = 'reward' AND action = 'create' AND entity_id = $1",
    )
    .bind(reward_id.to_string())
    .fetch_one(&pool)
    .await
    .expect("audit row for reward create");

    assert_eq!(actor, Some(admin.user_id));
}
