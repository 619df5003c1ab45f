//! Prometheus 指标模块
//!
//! recorder 全局安装一次，指标通过独立端口的 `/metrics` 暴露。

use std::net::SocketAddr;

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::{net::TcpListener, task::JoinHandle};
use tracing::{error, info};

use crate::config::ObservabilityConfig;

/// 延迟类指标的直方图分桶（秒）
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// 指标服务器守卫，drop 时停止抓取端点
pub struct MetricsHandle {
    server: JoinHandle<()>,
}

impl Drop for MetricsHandle {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// 安装 Prometheus recorder 并启动抓取端点
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .add_global_label("service", config.service_name.clone())
        .install_recorder()?;

    describe_metrics();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server = serve_metrics(addr, handle).await?;

    Ok(MetricsHandle { server })
}

fn describe_metrics() {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request duration"
    );
    metrics::describe_counter!(
        "coupon_redemptions_total",
        "Coupon redemption attempts by outcome"
    );
    metrics::describe_histogram!(
        "coupon_redemption_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent validating and issuing a coupon"
    );
}

async fn serve_metrics(addr: SocketAddr, handle: PrometheusHandle) -> Result<JoinHandle<()>> {
    let app = Router::new().route("/metrics", get(move || std::future::ready(handle.render())));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics endpoint listening on {}", addr);

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    }))
}

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status
    )
    .record(duration_secs);
}

/// 记录优惠券兑换
///
/// `outcome` 为 "success" 或错误码。请求中的 ID 不作为标签
#[inline]
pub fn record_redemption(outcome: &str, duration_secs: f64) {
    metrics::counter!("coupon_redemptions_total", "outcome" => outcome.to_string()).increment(1);
    metrics::histogram!("coupon_redemption_duration_seconds").record(duration_secs);
}
