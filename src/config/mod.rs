//! 配置管理模块
//!
//! 提供环境变量配置加载、端点列表解析和校验功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{EnvConfigLoader, ProcessEnv, VarSource};
pub use types::{parse_endpoint_list, Endpoint, MetricsConfig, ProbeConfig};
