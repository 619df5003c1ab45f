//! 优惠券兑换服务
//!
//! 按固定顺序执行校验，任一环节失败即中止：
//! 1. 奖励存在且处于有效期
//! 2. 滚动窗口内兑换次数未达总上限
//! 3. 当日兑换次数未达单日上限
//! 4. 玩家未兑换过该奖励
//! 5. 生成券码并原子写入优惠券与兑换记录
//!
//! 第 5 步之前不产生任何写入。

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use coupon_shared::observability::metrics::record_redemption;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{CouponError, Result};
use crate::models::{Coupon, NewRedemption};
use crate::repository::CouponStore;
use crate::service::policy::RedemptionPolicy;

/// 兑换校验器
pub struct RedemptionValidator {
    store: Arc<dyn CouponStore>,
    policy: RedemptionPolicy,
}

impl RedemptionValidator {
    pub fn new(store: Arc<dyn CouponStore>, policy: RedemptionPolicy) -> Self {
        Self { store, policy }
    }

    /// 以当前时间兑换
    pub async fn redeem(&self, player_id: i64, reward_id: i64) -> Result<Coupon> {
        self.redeem_at(player_id, reward_id, Utc::now()).await
    }

    /// 以指定时间兑换
    #[instrument(skip(self))]
    pub async fn redeem_at(
        &self,
        player_id: i64,
        reward_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Coupon> {
        let started = Instant::now();
        let result = self.validate_and_issue(player_id, reward_id, now).await;

        let outcome = match &result {
            Ok(coupon) => {
                info!(coupon_id = coupon.id, "优惠券兑换成功");
                "success"
            }
            Err(e) if e.is_business_error() => {
                warn!(code = e.error_code(), reason = %e, "优惠券兑换被拒绝");
                e.error_code()
            }
            Err(e) => {
                error!(
                    code = e.error_code(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "优惠券兑换失败"
                );
                e.error_code()
            }
        };
        record_redemption(outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn validate_and_issue(
        &self,
        player_id: i64,
        reward_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Coupon> {
        let reward = self
            .store
            .find_reward(reward_id)
            .await?
            .filter(|r| r.is_active(now))
            .ok_or(CouponError::InvalidReward { reward_id })?;

        let limits = self.policy.limits_for(&reward);

        let window_count = self
            .store
            .count_redemptions(player_id, self.policy.window_start(now), now)
            .await?;
        if window_count >= limits.total {
            return Err(CouponError::TotalLimitExceeded {
                player_id,
                count: window_count,
                limit: limits.total,
            });
        }

        let day_count = self
            .store
            .count_redemptions(player_id, self.policy.day_start(now), now)
            .await?;
        if day_count >= limits.per_day {
            return Err(CouponError::DailyLimitExceeded {
                player_id,
                count: day_count,
                limit: limits.per_day,
            });
        }

        if self
            .store
            .find_redemption(player_id, reward_id)
            .await?
            .is_some()
        {
            return Err(CouponError::AlreadyRedeemed {
                player_id,
                reward_id,
            });
        }

        let redemption = self
            .store
            .issue_coupon(&NewRedemption {
                player_id,
                reward_id,
                coupon_value: generate_coupon_value(now),
                redeemed_at: now,
            })
            .await?;

        Ok(redemption.coupon)
    }
}

/// 生成券码：`CP` + 日期 + 12 位十六进制随机串
pub fn generate_coupon_value(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("CP{}{}", now.format("%Y%m%d"), &random[..12])
}
