//! 内存存储
//!
//! 单把互斥锁保护全部数据，写入与唯一性检查在同一临界区内完成，
//! 与 PostgreSQL 实现提供相同的 (player_id, reward_id) 原子保证。
//! 适用于测试和本地开发。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::traits::CouponStore;
use crate::error::{CouponError, Result};
use crate::models::{Coupon, NewRedemption, PlayerCoupon, Redemption, Reward};

#[derive(Debug, Default)]
struct Inner {
    rewards: HashMap<i64, Reward>,
    coupons: Vec<Coupon>,
    player_coupons: Vec<PlayerCoupon>,
    next_coupon_id: i64,
    next_player_coupon_id: i64,
}

impl Inner {
    fn find_link(&self, player_id: i64, reward_id: i64) -> Option<&PlayerCoupon> {
        self.player_coupons
            .iter()
            .find(|pc| pc.player_id == player_id && pc.reward_id == reward_id)
    }

    fn insert(&mut self, redemption: &NewRedemption) -> Redemption {
        self.next_coupon_id += 1;
        let coupon = Coupon {
            id: self.next_coupon_id,
            value: redemption.coupon_value.clone(),
            reward_id: redemption.reward_id,
        };

        self.next_player_coupon_id += 1;
        let player_coupon = PlayerCoupon {
            id: self.next_player_coupon_id,
            player_id: redemption.player_id,
            coupon_id: coupon.id,
            reward_id: redemption.reward_id,
            redeemed_at: redemption.redeemed_at,
        };

        self.coupons.push(coupon.clone());
        self.player_coupons.push(player_coupon.clone());

        Redemption {
            coupon,
            player_coupon,
        }
    }
}

/// 内存优惠券存储
#[derive(Debug, Default)]
pub struct MemoryCouponStore {
    inner: Mutex<Inner>,
}

impl MemoryCouponStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖奖励
    pub fn insert_reward(&self, reward: Reward) {
        self.inner.lock().rewards.insert(reward.id, reward);
    }

    /// 直接写入一条历史兑换（不做任何校验）
    ///
    /// 用于构造"已兑换若干次"的场景
    pub fn seed_redemption(
        &self,
        player_id: i64,
        reward_id: i64,
        redeemed_at: DateTime<Utc>,
    ) -> Redemption {
        let mut inner = self.inner.lock();
        let value = format!("SEED-{}", inner.next_coupon_id + 1);
        inner.insert(&NewRedemption {
            player_id,
            reward_id,
            coupon_value: value,
            redeemed_at,
        })
    }

    /// 所有已发放的优惠券
    pub fn coupons(&self) -> Vec<Coupon> {
        self.inner.lock().coupons.clone()
    }

    /// 所有兑换记录
    pub fn player_coupons(&self) -> Vec<PlayerCoupon> {
        self.inner.lock().player_coupons.clone()
    }
}

#[async_trait]
impl CouponStore for MemoryCouponStore {
    async fn find_reward(&self, reward_id: i64) -> Result<Option<Reward>> {
        Ok(self.inner.lock().rewards.get(&reward_id).cloned())
    }

    async fn count_redemptions(
        &self,
        player_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let inner = self.inner.lock();
        let count = inner
            .player_coupons
            .iter()
            .filter(|pc| pc.player_id == player_id)
            .filter(|pc| pc.redeemed_at > from && pc.redeemed_at <= to)
            .count();

        i64::try_from(count).map_err(|e| CouponError::Internal(e.to_string()))
    }

    async fn find_redemption(
        &self,
        player_id: i64,
        reward_id: i64,
    ) -> Result<Option<PlayerCoupon>> {
        Ok(self.inner.lock().find_link(player_id, reward_id).cloned())
    }

    async fn issue_coupon(&self, redemption: &NewRedemption) -> Result<Redemption> {
        let mut inner = self.inner.lock();

        if inner
            .find_link(redemption.player_id, redemption.reward_id)
            .is_some()
        {
            return Err(CouponError::AlreadyRedeemed {
                player_id: redemption.player_id,
                reward_id: redemption.reward_id,
            });
        }

        Ok(inner.insert(redemption))
    }
}
