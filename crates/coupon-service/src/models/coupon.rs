//! 优惠券与兑换记录
//!
//! 实体之间只通过整型 ID 关联，不持有对方的对象引用。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 优惠券
///
/// 每次成功兑换恰好创建一张
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: i64,
    /// 券码（不透明字符串）
    pub value: String,
    /// 所属奖励 ID
    pub reward_id: i64,
}

/// 玩家兑换记录
///
/// 玩家与优惠券的关联，创建后不再修改或删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCoupon {
    pub id: i64,
    pub player_id: i64,
    pub coupon_id: i64,
    /// 奖励 ID（冗余自优惠券，用于唯一约束）
    pub reward_id: i64,
    pub redeemed_at: DateTime<Utc>,
}

/// 待写入的兑换
///
/// 优惠券与兑换记录在存储层原子写入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRedemption {
    pub player_id: i64,
    pub reward_id: i64,
    pub coupon_value: String,
    pub redeemed_at: DateTime<Utc>,
}

/// 一次成功兑换写入的两条记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub coupon: Coupon,
    pub player_coupon: PlayerCoupon,
}
