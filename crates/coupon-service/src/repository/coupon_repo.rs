//! PostgreSQL 优惠券仓储
//!
//! 提供奖励、优惠券、兑换记录的数据访问

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use super::traits::CouponStore;
use crate::error::{CouponError, Result};
use crate::models::{Coupon, NewRedemption, PlayerCoupon, Redemption, Reward};

/// 优惠券仓储
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 奖励 ====================

    /// 获取单个奖励
    pub async fn get_reward(&self, id: i64) -> Result<Option<Reward>> {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, name, start_date, end_date, per_day_limit, total_limit
            FROM rewards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reward)
    }

    // ==================== 兑换记录 ====================

    /// 统计玩家在时间段内的兑换次数
    pub async fn count_player_redemptions(
        &self,
        player_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) AS count
            FROM player_coupons
            WHERE player_id = $1 AND redeemed_at > $2 AND redeemed_at <= $3
            "#,
        )
        .bind(player_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 查询玩家对某奖励的兑换记录
    ///
    /// 通过优惠券的奖励关联匹配
    pub async fn get_player_redemption(
        &self,
        player_id: i64,
        reward_id: i64,
    ) -> Result<Option<PlayerCoupon>> {
        let record = sqlx::query_as::<_, PlayerCoupon>(
            r#"
            SELECT pc.id, pc.player_id, pc.coupon_id, c.reward_id, pc.redeemed_at
            FROM player_coupons pc
            JOIN coupons c ON c.id = pc.coupon_id
            WHERE pc.player_id = $1 AND c.reward_id = $2
            LIMIT 1
            "#,
        )
        .bind(player_id)
        .bind(reward_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// 在单个事务中写入优惠券与兑换记录
    ///
    /// 兑换记录依赖 (player_id, reward_id) 唯一索引：冲突时回滚事务，
    /// 已插入的优惠券一并撤销
    #[instrument(
        skip(self, redemption),
        fields(player_id = redemption.player_id, reward_id = redemption.reward_id)
    )]
    pub async fn create_redemption(&self, redemption: &NewRedemption) -> Result<Redemption> {
        let mut tx = self.pool.begin().await?;

        let coupon =
            Self::create_coupon_in_tx(&mut tx, &redemption.coupon_value, redemption.reward_id)
                .await?;

        let player_coupon = Self::create_player_coupon_in_tx(&mut tx, redemption, coupon.id).await?;

        let Some(player_coupon) = player_coupon else {
            tx.rollback().await?;
            debug!("兑换记录唯一约束冲突，事务已回滚");
            return Err(CouponError::AlreadyRedeemed {
                player_id: redemption.player_id,
                reward_id: redemption.reward_id,
            });
        };

        tx.commit().await?;

        Ok(Redemption {
            coupon,
            player_coupon,
        })
    }

    /// 在事务中创建优惠券
    pub async fn create_coupon_in_tx(
        tx: &mut PgConnection,
        value: &str,
        reward_id: i64,
    ) -> Result<Coupon> {
        let coupon = sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons (value, reward_id)
            VALUES ($1, $2)
            RETURNING id, value, reward_id
            "#,
        )
        .bind(value)
        .bind(reward_id)
        .fetch_one(tx)
        .await?;

        Ok(coupon)
    }

    /// 在事务中创建兑换记录
    ///
    /// 唯一约束冲突时返回 None
    pub async fn create_player_coupon_in_tx(
        tx: &mut PgConnection,
        redemption: &NewRedemption,
        coupon_id: i64,
    ) -> Result<Option<PlayerCoupon>> {
        let record = sqlx::query_as::<_, PlayerCoupon>(
            r#"
            INSERT INTO player_coupons (player_id, coupon_id, reward_id, redeemed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (player_id, reward_id) DO NOTHING
            RETURNING id, player_id, coupon_id, reward_id, redeemed_at
            "#,
        )
        .bind(redemption.player_id)
        .bind(coupon_id)
        .bind(redemption.reward_id)
        .bind(redemption.redeemed_at)
        .fetch_optional(tx)
        .await?;

        Ok(record)
    }
}

#[async_trait]
impl CouponStore for CouponRepository {
    async fn find_reward(&self, reward_id: i64) -> Result<Option<Reward>> {
        self.get_reward(reward_id).await
    }

    async fn count_redemptions(
        &self,
        player_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        self.count_player_redemptions(player_id, from, to).await
    }

    async fn find_redemption(
        &self,
        player_id: i64,
        reward_id: i64,
    ) -> Result<Option<PlayerCoupon>> {
        self.get_player_redemption(player_id, reward_id).await
    }

    async fn issue_coupon(&self, redemption: &NewRedemption) -> Result<Redemption> {
        self.create_redemption(redemption).await
    }
}
