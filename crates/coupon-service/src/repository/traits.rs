//! 仓储 Trait 定义
//!
//! 兑换校验只依赖这四个操作的契约，不依赖具体存储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{NewRedemption, PlayerCoupon, Redemption, Reward};

/// 优惠券存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// 按 ID 查询奖励
    async fn find_reward(&self, reward_id: i64) -> Result<Option<Reward>>;

    /// 统计玩家在 (from, to] 时间段内的兑换次数
    ///
    /// 恰好发生在 `from` 的兑换不计入
    async fn count_redemptions(
        &self,
        player_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64>;

    /// 查询玩家对某奖励的兑换记录（经由优惠券关联奖励）
    async fn find_redemption(&self, player_id: i64, reward_id: i64)
    -> Result<Option<PlayerCoupon>>;

    /// 原子写入优惠券与兑换记录
    ///
    /// 同一 (player_id, reward_id) 已存在兑换时，不写入任何记录并返回
    /// `CouponError::AlreadyRedeemed`
    async fn issue_coupon(&self, redemption: &NewRedemption) -> Result<Redemption>;
}
