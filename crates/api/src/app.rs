use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_dev,
    require_user_auth, security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    applications, audit_logs, auth, criticalities, health, order_statuses, orders, reports,
    rewards, users,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    // Rate limiting is enabled when rate_limit_per_minute > 0
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Auth routes: anonymous, but rate limited against brute force
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Routes for any authenticated user
    // Middleware order: auth runs first, then rate limiting (keyed by user)
    let user_routes = Router::new()
        .route("/api/v1/users/me", get(users::get_current_user))
        .route("/api/v1/users/me", put(users::update_current_user))
        .route("/api/v1/applications", get(applications::list_applications))
        .route("/api/v1/applications/:id", get(applications::get_application))
        .route("/api/v1/criticalities", get(criticalities::list_criticalities))
        .route("/api/v1/criticalities/:id", get(criticalities::get_criticality))
        .route("/api/v1/rewards", get(rewards::list_rewards))
        .route("/api/v1/rewards/:id", get(rewards::get_reward))
        .route("/api/v1/order-statuses", get(order_statuses::list_order_statuses))
        .route("/api/v1/order-statuses/:id", get(order_statuses::get_order_status))
        .route("/api/v1/reports", post(reports::create_report))
        .route("/api/v1/reports", get(reports::list_reports))
        .route("/api/v1/reports/:id", get(reports::get_report))
        .route("/api/v1/orders", post(orders::create_order))
        .route("/api/v1/orders", get(orders::list_orders))
        .route("/api/v1/orders/:id", get(orders::get_order))
        .route("/api/v1/orders/:id", delete(orders::delete_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Routes requiring at least the dev role
    let dev_routes = Router::new()
        .route("/api/v1/applications", post(applications::create_application))
        .route("/api/v1/applications/:id", put(applications::update_application))
        .route("/api/v1/applications/:id", delete(applications::delete_application))
        .route("/api/v1/reports/:id/status", put(reports::update_report_status))
        .route("/api/v1/orders/:id/confirm", put(orders::confirm_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_dev))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Routes requiring the admin role
    let admin_routes = Router::new()
        .route("/api/v1/admin/users", get(users::admin_list_users))
        .route("/api/v1/admin/users/:id", put(users::admin_update_user))
        .route("/api/v1/admin/users/:id", delete(users::admin_delete_user))
        .route("/api/v1/criticalities", post(criticalities::create_criticality))
        .route("/api/v1/criticalities/:id", put(criticalities::update_criticality))
        .route("/api/v1/criticalities/:id", delete(criticalities::delete_criticality))
        .route("/api/v1/rewards", post(rewards::create_reward))
        .route("/api/v1/rewards/:id", put(rewards::update_reward))
        .route("/api/v1/rewards/:id", delete(rewards::delete_reward))
        .route("/api/v1/reports/:id", delete(reports::delete_report))
        .route("/api/v1/order-statuses", post(order_statuses::create_order_status))
        .route("/api/v1/order-statuses/:id", delete(order_statuses::delete_order_status))
        .route("/api/v1/admin/audit-logs", get(audit_logs::list_audit_logs))
        .route("/api/v1/admin/audit-logs/:id", get(audit_logs::get_audit_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(user_routes)
        .merge(dev_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
