//! 优惠券兑换 API 处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    dto::{ApiResponse, CouponDto, RedeemCouponRequest},
    error::CouponError,
    state::AppState,
};

/// 兑换优惠券
///
/// POST /redeem-coupon
///
/// 请求体格式错误或 ID 非正整数时直接返回 400，不进入兑换流程
pub async fn redeem_coupon(
    State(state): State<AppState>,
    payload: Result<Json<RedeemCouponRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CouponDto>>), CouponError> {
    let Json(req) = payload.map_err(|e| CouponError::Validation(e.body_text()))?;
    req.validate()?;

    let coupon = state
        .validator
        .redeem(req.player_id, req.reward_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CouponDto::from(coupon))),
    ))
}
