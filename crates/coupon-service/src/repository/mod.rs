//! 数据库仓储层
//!
//! 提供奖励、优惠券、兑换记录的数据访问接口。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 使用 SQLx 进行类型安全的数据库操作
//! - 两次写入的事务边界由仓储负责，服务层只感知原子的 `issue_coupon`
//! - 定义 trait 接口以支持 mock 测试

mod coupon_repo;
mod memory_store;
mod traits;

pub use coupon_repo::CouponRepository;
pub use memory_store::MemoryCouponStore;
pub use traits::*;

/// 内嵌的数据库迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
