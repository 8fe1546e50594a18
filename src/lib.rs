//! Port Vitals - TCP端口存活探测工具
//!
//! 周期性地对一组 `host:port` 发起 TCP 连接，并通过 Prometheus 导出结果：
//! - 按 RESCAN 间隔顺序（或限流并发）探测
//! - `/metrics` 导出汇总和逐端点状态
//! - 可选的 webhook 告警
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod notification;
pub mod web;

// 重新导出主要类型
pub use config::{Endpoint, MetricsConfig, ProbeConfig};
pub use error::PortVitalsError;
pub use health::{CycleSummary, PollScheduler, ProbeResult, ProbeStatus, Prober, TcpProber};
pub use web::{MetricsCollector, MetricsServer};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
