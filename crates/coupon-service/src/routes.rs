//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, post},
};
use coupon_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 构建完整应用路由
///
/// 可观测性中间件在最外层，request_id 先于 http_tracing 执行
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/redeem-coupon", post(handlers::redeem::redeem_coupon))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
