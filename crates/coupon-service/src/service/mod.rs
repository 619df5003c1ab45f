//! 服务层
//!
//! 兑换校验流程与策略参数

pub mod policy;
pub mod redemption_service;

pub use policy::{RedemptionLimits, RedemptionPolicy};
pub use redemption_service::{RedemptionValidator, generate_coupon_value};
