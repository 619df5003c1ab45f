//! 优惠券兑换服务入口
//!
//! 提供 POST /redeem-coupon HTTP 接口。

use std::sync::Arc;

use anyhow::Result;
use coupon_redemption::{
    AppState, CouponRepository, MIGRATOR, RedemptionPolicy, RedemptionValidator, build_router,
};
use coupon_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "coupon-service";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载配置，失败时回退到默认值（日志初始化后再告警）
    let (config, load_error) = match AppConfig::load(SERVICE_NAME) {
        Ok(config) => (config, None),
        Err(e) => (
            AppConfig {
                service_name: SERVICE_NAME.to_string(),
                ..AppConfig::default()
            },
            Some(e),
        ),
    };

    // 2. 可观测性
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    if let Some(e) = load_error {
        warn!(code = e.code(), "Failed to load config, using defaults: {}", e);
    }

    info!(
        environment = %config.environment,
        limit_source = ?config.redemption.limit_source,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    // 3. 策略参数非法时拒绝启动
    let policy = RedemptionPolicy::from_config(&config.redemption)?;

    // 4. 数据库与迁移
    let db = Database::connect_and_migrate(&config.database, &MIGRATOR).await?;

    // 5. 组装服务：CouponRepository → RedemptionValidator → AppState
    let store = Arc::new(CouponRepository::new(db.pool().clone()));
    let validator = Arc::new(RedemptionValidator::new(store, policy));
    let state = AppState::new(validator, Some(db.clone()));

    let app = build_router(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号（SIGTERM 或 Ctrl+C）
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
