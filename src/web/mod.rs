//! 指标导出模块
//!
//! 通过 HTTP `/metrics` 暴露 Prometheus 文本格式的探测指标

use std::sync::Arc;

pub mod handlers;
pub mod metrics;
pub mod server;

pub use metrics::MetricsCollector;
pub use server::MetricsServer;

/// 路由共享状态
#[derive(Debug, Clone)]
pub struct MetricsState {
    /// 指标收集器，调度器写入，这里只读
    pub collector: Arc<MetricsCollector>,
}

impl MetricsState {
    /// 创建新的路由状态
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }
}
