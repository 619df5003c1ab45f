//! 请求与响应 DTO
//!
//! JSON 字段统一使用 camelCase

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Coupon;

/// 兑换请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCouponRequest {
    #[validate(range(min = 1, message = "playerId must be a positive integer"))]
    pub player_id: i64,
    #[validate(range(min = 1, message = "rewardId must be a positive integer"))]
    pub reward_id: i64,
}

/// 优惠券响应 DTO
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CouponDto {
    pub id: i64,
    pub value: String,
    pub reward_id: i64,
}

impl From<Coupon> for CouponDto {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            value: coupon.value,
            reward_id: coupon.reward_id,
        }
    }
}

/// API 统一响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "OK".to_string(),
            data: Some(data),
        }
    }
}
