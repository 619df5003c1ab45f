//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use coupon_shared::database::Database;

use crate::service::RedemptionValidator;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 兑换校验器
    pub validator: Arc<RedemptionValidator>,
    /// PostgreSQL 连接池，使用内存存储时为 None
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(validator: Arc<RedemptionValidator>, database: Option<Database>) -> Self {
        Self {
            validator,
            database,
        }
    }
}
