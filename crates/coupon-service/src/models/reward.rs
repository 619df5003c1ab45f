//! 奖励定义
//!
//! 奖励由运营侧维护，本服务只读。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 奖励（兑换活动定义）
///
/// 包含有效时间窗口和兑换上限
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: i64,
    /// 奖励名称
    pub name: String,
    /// 生效开始时间
    pub start_date: DateTime<Utc>,
    /// 生效结束时间
    pub end_date: DateTime<Utc>,
    /// 单日兑换上限
    pub per_day_limit: i32,
    /// 滚动 7 天窗口内的兑换上限
    pub total_limit: i32,
}

impl Reward {
    /// 检查奖励在给定时刻是否处于有效期内（边界包含）
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_date && now <= self.end_date
    }
}
