//! 兑换策略
//!
//! 决定上限取值来源以及计数所用的时间窗口边界

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, Utc};
use coupon_shared::config::{LimitSource, RedemptionConfig};
use coupon_shared::error::{InfraError, Result};

use crate::models::Reward;

/// 一次兑换适用的上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionLimits {
    /// 滚动窗口内的总上限
    pub total: i64,
    /// 当日上限
    pub per_day: i64,
}

/// 兑换策略
#[derive(Debug, Clone)]
pub struct RedemptionPolicy {
    limit_source: LimitSource,
    fixed: RedemptionLimits,
    window_days: i64,
    offset: FixedOffset,
}

impl RedemptionPolicy {
    /// 从配置构建策略，配置非法时返回错误
    pub fn from_config(config: &RedemptionConfig) -> Result<Self> {
        config.validate()?;

        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            InfraError::invalid_config(format!(
                "redemption.utc_offset_minutes out of range: {}",
                config.utc_offset_minutes
            ))
        })?;

        Ok(Self {
            limit_source: config.limit_source,
            fixed: RedemptionLimits {
                total: config.total_limit,
                per_day: config.per_day_limit,
            },
            window_days: config.window_days,
            offset,
        })
    }

    pub fn limit_source(&self) -> LimitSource {
        self.limit_source
    }

    /// 计算奖励适用的上限
    pub fn limits_for(&self, reward: &Reward) -> RedemptionLimits {
        match self.limit_source {
            LimitSource::Reward => RedemptionLimits {
                total: i64::from(reward.total_limit),
                per_day: i64::from(reward.per_day_limit),
            },
            LimitSource::Fixed => self.fixed,
        }
    }

    /// 滚动窗口起点：`window_days` 天前那一天的零点
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.local_midnight(now, self.window_days)
    }

    /// 当日零点
    pub fn day_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.local_midnight(now, 0)
    }

    fn local_midnight(&self, now: DateTime<Utc>, days_back: i64) -> DateTime<Utc> {
        let local_date = now.with_timezone(&self.offset).date_naive() - Duration::days(days_back);
        let local_midnight = local_date.and_time(NaiveTime::MIN);
        (local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

impl Default for RedemptionPolicy {
    fn default() -> Self {
        let config = RedemptionConfig::default();
        Self {
            limit_source: config.limit_source,
            fixed: RedemptionLimits {
                total: config.total_limit,
                per_day: config.per_day_limit,
            },
            window_days: config.window_days,
            offset: Utc.fix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reward(total_limit: i32, per_day_limit: i32) -> Reward {
        let now = Utc::now();
        Reward {
            id: 1,
            name: "Test".to_string(),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            per_day_limit,
            total_limit,
        }
    }

    #[test]
    fn test_limits_from_reward() {
        let policy = RedemptionPolicy::default();
        assert_eq!(policy.limit_source(), LimitSource::Reward);

        let limits = policy.limits_for(&reward(10, 2));
        assert_eq!(limits, RedemptionLimits { total: 10, per_day: 2 });
    }

    #[test]
    fn test_fixed_limits_ignore_reward() {
        let config = RedemptionConfig {
            limit_source: LimitSource::Fixed,
            ..Default::default()
        };
        let policy = RedemptionPolicy::from_config(&config).unwrap();

        let limits = policy.limits_for(&reward(100, 50));
        assert_eq!(limits, RedemptionLimits { total: 21, per_day: 3 });
    }

    #[test]
    fn test_window_boundaries_utc() {
        let policy = RedemptionPolicy::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();

        assert_eq!(
            policy.day_start(now),
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            policy.window_start(now),
            Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_window_boundaries_with_offset() {
        let config = RedemptionConfig {
            utc_offset_minutes: 8 * 60,
            ..Default::default()
        };
        let policy = RedemptionPolicy::from_config(&config).unwrap();

        // UTC 20:00 已是 +08:00 的次日凌晨 4 点
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap();
        assert_eq!(
            policy.day_start(now),
            Utc.with_ymd_and_hms(2024, 3, 15, 16, 0, 0).unwrap()
        );
        assert_eq!(
            policy.window_start(now),
            Utc.with_ymd_and_hms(2024, 3, 8, 16, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RedemptionConfig {
            window_days: 0,
            ..Default::default()
        };
        let err = RedemptionPolicy::from_config(&config).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");

        let config = RedemptionConfig {
            utc_offset_minutes: 24 * 60,
            ..Default::default()
        };
        assert!(RedemptionPolicy::from_config(&config).is_err());

        let config = RedemptionConfig {
            per_day_limit: -1,
            ..Default::default()
        };
        assert!(RedemptionPolicy::from_config(&config).is_err());
    }
}
