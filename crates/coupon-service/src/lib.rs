//! 优惠券兑换服务
//!
//! 校验玩家对奖励的兑换资格并发放优惠券。
//!
//! ## 核心功能
//!
//! - **有效期校验**：奖励必须存在且处于有效时间窗口内
//! - **频次限制**：滚动窗口总上限与单日上限
//! - **防重复兑换**：同一玩家对同一奖励只能兑换一次，并发请求下同样成立
//! - **券码发放**：生成券码，原子写入优惠券与兑换记录
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 存储接口及 PostgreSQL / 内存实现
//! - `service`: 兑换校验与策略
//! - `dto`: 请求和响应的数据传输对象
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use dto::{ApiResponse, CouponDto, RedeemCouponRequest};
pub use error::{CouponError, Result};
pub use models::*;
pub use repository::{CouponRepository, CouponStore, MIGRATOR, MemoryCouponStore};
pub use routes::build_router;
pub use service::{RedemptionLimits, RedemptionPolicy, RedemptionValidator};
pub use state::AppState;
