//! 数据库连接管理模块
//!
//! PostgreSQL 连接池、启动迁移与就绪检查。

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{Span, field, info, instrument};

use crate::config::DatabaseConfig;
use crate::error::{InfraError, Result};

/// 就绪检查超时
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// 数据库连接池包装
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 创建数据库连接池
    #[instrument(skip(config), fields(db = field::Empty))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options: PgConnectOptions = config.url.parse()?;
        Span::current().record("db", connection_target(&options).as_str());

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Database connection pool created"
        );

        Ok(Self { pool })
    }

    /// 连接数据库，并在 `run_migrations` 开启时执行迁移
    pub async fn connect_and_migrate(config: &DatabaseConfig, migrator: &Migrator) -> Result<Self> {
        let db = Self::connect(config).await?;
        if config.run_migrations {
            db.run_migrations(migrator).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 健康检查，超时视为失败
    pub async fn health_check(&self) -> Result<()> {
        let ping = sqlx::query("SELECT 1").execute(&self.pool);
        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, ping).await {
            Ok(result) => result.map(|_| ()).map_err(InfraError::from),
            Err(_) => Err(InfraError::Internal(
                "database health check timed out".to_string(),
            )),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }

    /// 执行编译期嵌入的迁移
    #[instrument(skip(self, migrator))]
    pub async fn run_migrations(&self, migrator: &Migrator) -> Result<()> {
        migrator.run(&self.pool).await?;
        info!(
            migrations = migrator.iter().count(),
            "Database migrations applied"
        );
        Ok(())
    }
}

/// 日志中使用的连接目标，形如 `user@host:port/database`，不含密码
pub fn connection_target(options: &PgConnectOptions) -> String {
    format!(
        "{}@{}:{}/{}",
        options.get_username(),
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or_default()
    )
}
