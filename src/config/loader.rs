//! 配置加载器实现
//!
//! 从环境变量读取配置，所有字段都有默认值，非法取值静默回退为默认值

use crate::config::types::{
    default_bind_address, default_listen_port, default_max_concurrent, default_metrics_help,
    default_metrics_name, default_metrics_namespace, default_rescan_interval, default_timeout,
    parse_endpoint_list, Endpoint, MetricsConfig, ProbeConfig,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const ENV_TIMEOUT: &str = "TIMEOUT";
pub const ENV_NODE_IP: &str = "NODEIP";
pub const ENV_CLUSTER_NAME: &str = "CLUSTERNAME";
pub const ENV_WEBHOOK_URL: &str = "WEBHOOKURL";
pub const ENV_RESCAN: &str = "RESCAN";
pub const ENV_ENDPOINTS: &str = "ENDPOINTS";
pub const ENV_ENDPOINTS_FILE: &str = "ENDPOINTS_FILE";
pub const ENV_MAX_CONCURRENT: &str = "MAX_CONCURRENT";
pub const ENV_ALERTS_ENABLED: &str = "ALERTS_ENABLED";
pub const ENV_ALERT_TEMPLATE: &str = "ALERT_TEMPLATE";
pub const ENV_METRICS_NAMESPACE: &str = "METRICS_NAMESPACE";
pub const ENV_METRICS_NAME: &str = "METRICS_NAME";
pub const ENV_LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
pub const ENV_LISTEN_PORT: &str = "LISTEN_PORT";

/// 变量来源，生产环境读取进程环境变量，测试中可以替换为映射表
pub trait VarSource: Send + Sync {
    /// 查询变量，未设置时返回 `None`
    fn var(&self, key: &str) -> Option<String>;
}

/// 进程环境变量
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// 环境变量配置加载器
#[derive(Debug, Clone)]
pub struct EnvConfigLoader<S = ProcessEnv> {
    source: S,
}

impl EnvConfigLoader<ProcessEnv> {
    /// 从进程环境变量加载
    pub fn from_env() -> Self {
        Self { source: ProcessEnv }
    }
}

impl<S: VarSource> EnvConfigLoader<S> {
    /// 使用指定的变量来源创建加载器
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// 加载配置
    ///
    /// 该方法不会失败：无法解析的数值和布尔值回退为默认值
    pub fn load(&self) -> ProbeConfig {
        let config = ProbeConfig {
            timeout_seconds: self.get_env_parsed(ENV_TIMEOUT, default_timeout()),
            node_id: self.get_env(ENV_NODE_IP, ""),
            cluster_name: self.get_env(ENV_CLUSTER_NAME, ""),
            webhook_url: self.get_env(ENV_WEBHOOK_URL, ""),
            rescan_interval_seconds: self.get_env_parsed(ENV_RESCAN, default_rescan_interval()),
            endpoints: self.load_endpoints(),
            max_concurrent_probes: self
                .get_env_parsed(ENV_MAX_CONCURRENT, default_max_concurrent()),
            alerts_enabled: self.get_env_bool(ENV_ALERTS_ENABLED, false),
            alert_template_path: self
                .source
                .var(ENV_ALERT_TEMPLATE)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            metrics: MetricsConfig {
                namespace: self.get_env(ENV_METRICS_NAMESPACE, &default_metrics_namespace()),
                name: self.get_env(ENV_METRICS_NAME, &default_metrics_name()),
                help: default_metrics_help(),
                bind_address: self.get_env(ENV_LISTEN_ADDRESS, &default_bind_address()),
                port: self.get_env_parsed(ENV_LISTEN_PORT, default_listen_port()),
            },
        };

        info!(
            "配置加载完成，端点数量: {}，重扫间隔: {}秒，连接超时: {}秒",
            config.endpoints.len(),
            config.rescan_interval_seconds,
            config.timeout_seconds
        );

        config
    }

    /// 读取字符串变量，未设置时返回默认值
    fn get_env(&self, key: &str, default: &str) -> String {
        self.source
            .var(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// 读取并解析数值变量，解析失败时返回默认值
    fn get_env_parsed<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Copy + std::fmt::Debug,
    {
        match self.source.var(key) {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(value) => value,
                Err(_) => {
                    debug!("环境变量 {}={:?} 无法解析，使用默认值 {:?}", key, raw, default);
                    default
                }
            },
            None => default,
        }
    }

    /// 读取布尔变量
    fn get_env_bool(&self, key: &str, default: bool) -> bool {
        match self.source.var(key) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    debug!("环境变量 {}={:?} 不是布尔值，使用默认值 {}", key, raw, default);
                    default
                }
            },
            None => default,
        }
    }

    /// 加载端点列表
    ///
    /// 优先使用 `ENDPOINTS` 的内容，为空时再尝试读取 `ENDPOINTS_FILE` 指向的文件
    fn load_endpoints(&self) -> Vec<Endpoint> {
        let inline = self.get_env(ENV_ENDPOINTS, "");
        if !inline.trim().is_empty() {
            return parse_endpoint_list(&inline);
        }

        let Some(path) = self
            .source
            .var(ENV_ENDPOINTS_FILE)
            .filter(|p| !p.trim().is_empty())
        else {
            return Vec::new();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!("从文件加载端点列表: {}", path);
                parse_endpoint_list(&content)
            }
            Err(e) => {
                warn!("读取端点文件失败 {}: {}，端点列表为空", path, e);
                Vec::new()
            }
        }
    }
}
