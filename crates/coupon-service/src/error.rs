//! 优惠券兑换错误类型
//!
//! 四类业务拒绝对客户端可见且不可重试，系统错误只记录日志并返回通用提示。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// 优惠券服务错误类型
#[derive(Debug, Error)]
pub enum CouponError {
    // === 兑换拒绝 ===
    #[error("Invalid reward or reward date")]
    InvalidReward { reward_id: i64 },

    #[error("Player exceeded coupon total limits")]
    TotalLimitExceeded {
        player_id: i64,
        count: i64,
        limit: i64,
    },

    #[error("Player exceeded coupon per day limits")]
    DailyLimitExceeded {
        player_id: i64,
        count: i64,
        limit: i64,
    },

    #[error("Coupon already redeemed")]
    AlreadyRedeemed { player_id: i64, reward_id: i64 },

    // === 请求错误 ===
    #[error("Invalid request: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 服务 Result 类型别名
pub type Result<T> = std::result::Result<T, CouponError>;

impl CouponError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// 获取错误码（用于 API 响应和指标标签）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidReward { .. } => "INVALID_REWARD",
            Self::TotalLimitExceeded { .. } => "TOTAL_LIMIT_EXCEEDED",
            Self::DailyLimitExceeded { .. } => "DAILY_LIMIT_EXCEEDED",
            Self::AlreadyRedeemed { .. } => "ALREADY_REDEEMED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        if self.is_business_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for CouponError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "Internal server error, please retry later".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "Internal server error, please retry later".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for CouponError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
