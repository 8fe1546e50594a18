//! 指标HTTP服务器
//!
//! axum 路由只包含 `/metrics`，其他路径返回 404

use super::{handlers, MetricsCollector, MetricsState};
use crate::config::MetricsConfig;
use crate::error::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 指标HTTP服务器
#[derive(Debug)]
pub struct MetricsServer {
    /// 导出配置
    config: MetricsConfig,
    /// 路由共享状态
    state: MetricsState,
}

impl MetricsServer {
    /// 创建新的指标服务器
    pub fn new(config: MetricsConfig, collector: Arc<MetricsCollector>) -> Self {
        Self {
            config,
            state: MetricsState::new(collector),
        }
    }

    /// 构建路由
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(handlers::metrics))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// 绑定配置的监听地址并运行，直到收到关闭信号
    pub async fn run(&self, shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr: SocketAddr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// 在已绑定的监听器上提供服务
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("Prometheus指标: http://{}/metrics", local_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("接收到关闭信号，正在关闭指标服务器...");
            })
            .await?;

        info!("指标服务器已关闭");
        Ok(())
    }
}
