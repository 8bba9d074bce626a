//! Integration tests for the order settlement flow.
//!
//! Covers the transactional invariants:
//! - points and quantity are deducted atomically on settlement
//! - balances never go negative after any sequence of orders
//! - unavailable / out-of-stock rewards leave balances unchanged
//! - cancelling a CONFIRMED order restores exactly what was deducted
//! - cancelling a PENDING order does not refund

mod common;

use axum::http::Method;
use common::{
    create_reward, create_test_app, create_test_pool, get_points, get_quantity, parse_body,
    register_user, register_user_with_role, send_json, set_points, TestUser,
};
use domain::models::Role;
use serde_json::json;

#[tokio::test]
async fn test_settlement_deducts_points_and_quantity() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 500).await;

    let reward_id = create_reward(&app, &admin, 150, 3, true).await;

    let response = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;

    assert_eq!(response.status(), 201);
    let body = parse_body(response).await;
    assert_eq!(body["remainingPoints"], 350);
    assert_eq!(body["remainingQuantity"], 2);

    assert_eq!(get_points(&pool, hunter.user_id).await, 350);
    assert_eq!(get_quantity(&pool, reward_id).await, 2);
}

#[tokio::test]
async fn test_insufficient_points_leaves_balances_unchanged() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 50).await;

    let reward_id = create_reward(&app, &admin, 100, 5, true).await;

    let response = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;

    assert_eq!(response.status(), 400);
    assert_eq!(get_points(&pool, hunter.user_id).await, 50);
    assert_eq!(get_quantity(&pool, reward_id).await, 5);
}

#[tokio::test]
async fn test_points_never_go_negative_across_orders() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 100).await;

    let reward_id = create_reward(&app, &admin, 60, 10, true).await;

    // First order succeeds: 100 -> 40
    let first = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    assert_eq!(first.status(), 201);

    // Second order would need 60 > 40 and must fail
    let second = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    assert_eq!(second.status(), 400);

    let points = get_points(&pool, hunter.user_id).await;
    assert_eq!(points, 40);
    assert!(points >= 0);
    assert_eq!(get_quantity(&pool, reward_id).await, 9);
}

#[tokio::test]
async fn test_unavailable_reward_is_rejected() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 500).await;

    let reward_id = create_reward(&app, &admin, 100, 5, false).await;

    let response = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;

    assert_eq!(response.status(), 400);
    assert_eq!(get_points(&pool, hunter.user_id).await, 500);
    assert_eq!(get_quantity(&pool, reward_id).await, 5);
}

#[tokio::test]
async fn test_zero_quantity_reward_is_rejected() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 500).await;

    let reward_id = create_reward(&app, &admin, 100, 0, true).await;

    let response = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;

    assert_eq!(response.status(), 400);
    assert_eq!(get_points(&pool, hunter.user_id).await, 500);
}

#[tokio::test]
async fn test_unknown_reward_is_not_found() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let hunter = register_user(&app, &TestUser::new()).await;

    let response = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": uuid::Uuid::new_v4()})),
    )
    .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_confirm_transitions_pending_order_once() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 200).await;

    let reward_id = create_reward(&app, &admin, 100, 2, true).await;

    let created = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    let order_id = parse_body(created).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let confirm = send_json(
        &app,
        Method::PUT,
        &format!("/api/v1/orders/{}/confirm", order_id),
        Some(&admin.access_token),
        None,
    )
    .await;
    assert_eq!(confirm.status(), 200);

    // CONFIRMED -> CONFIRMED is not a legal transition
    let again = send_json(
        &app,
        Method::PUT,
        &format!("/api/v1/orders/{}/confirm", order_id),
        Some(&admin.access_token),
        None,
    )
    .await;
    assert_eq!(again.status(), 409);
}

#[tokio::test]
async fn test_hunters_cannot_confirm_orders() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 200).await;

    let reward_id = create_reward(&app, &admin, 100, 2, true).await;
    let created = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    let order_id = parse_body(created).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let confirm = send_json(
        &app,
        Method::PUT,
        &format!("/api/v1/orders/{}/confirm", order_id),
        Some(&hunter.access_token),
        None,
    )
    .await;
    assert_eq!(confirm.status(), 403);
}

#[tokio::test]
async fn test_cancelling_confirmed_order_restores_balances() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 300).await;

    let reward_id = create_reward(&app, &admin, 120, 4, true).await;

    let created = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    let order_id = parse_body(created).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    send_json(
        &app,
        Method::PUT,
        &format!("/api/v1/orders/{}/confirm", order_id),
        Some(&admin.access_token),
        None,
    )
    .await;

    assert_eq!(get_points(&pool, hunter.user_id).await, 180);
    assert_eq!(get_quantity(&pool, reward_id).await, 3);

    let cancel = send_json(
        &app,
        Method::DELETE,
        &format!("/api/v1/orders/{}", order_id),
        Some(&hunter.access_token),
        None,
    )
    .await;
    assert_eq!(cancel.status(), 204);

    // Exactly the deducted amounts come back
    assert_eq!(get_points(&pool, hunter.user_id).await, 300);
    assert_eq!(get_quantity(&pool, reward_id).await, 4);
}

#[tokio::test]
async fn test_cancelling_pending_order_does_not_refund() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 300).await;

    let reward_id = create_reward(&app, &admin, 120, 4, true).await;

    let created = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    let order_id = parse_body(created).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let cancel = send_json(
        &app,
        Method::DELETE,
        &format!("/api/v1/orders/{}", order_id),
        Some(&hunter.access_token),
        None,
    )
    .await;
    assert_eq!(cancel.status(), 204);

    // Reversal applies to CONFIRMED orders only
    assert_eq!(get_points(&pool, hunter.user_id).await, 180);
    assert_eq!(get_quantity(&pool, reward_id).await, 3);
}

#[tokio::test]
async fn test_users_cannot_cancel_others_orders() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let owner = register_user(&app, &TestUser::new()).await;
    let stranger = register_user(&app, &TestUser::new()).await;
    set_points(&pool, owner.user_id, 200).await;

    let reward_id = create_reward(&app, &admin, 100, 2, true).await;
    let created = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&owner.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    let order_id = parse_body(created).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let cancel = send_json(
        &app,
        Method::DELETE,
        &format!("/api/v1/orders/{}", order_id),
        Some(&stranger.access_token),
        None,
    )
    .await;
    assert_eq!(cancel.status(), 403);
}

#[tokio::test]
async fn test_settlement_writes_audit_row() {
    let Some(pool) = create_test_pool().await else { return };
    let app = create_test_app(pool.clone());

    let admin =
        register_user_with_role(&app, &pool, &TestUser::new(), Role::Admin).await;
    let hunter = register_user(&app, &TestUser::new()).await;
    set_points(&pool, hunter.user_id, 200).await;

    let reward_id = create_reward(&app, &admin, 100, 2, true).await;
    let created = send_json(
        &app,
        Method::POST,
        "/api/v1/orders",
        Some(&hunter.access_token),
        Some(json!({"rewardId": reward_id})),
    )
    .await;
    let order_id = parse_body(created).await["order"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM audit_logs \
         WHERE entity_type = 'order' AND action = 'create' AND entity_id = $1",
    )
    .bind(&order_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(count, 1);
}
