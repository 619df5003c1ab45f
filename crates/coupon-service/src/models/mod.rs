//! 领域模型
//!
//! 奖励、优惠券及玩家兑换记录

pub mod coupon;
pub mod reward;

pub use coupon::{Coupon, NewRedemption, PlayerCoupon, Redemption};
pub use reward::Reward;
