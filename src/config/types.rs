//! 配置数据结构定义
//!
//! 定义探测器的配置结构体、端点列表解析和校验逻辑

use crate::error::ConfigError;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// 探测超时与重扫间隔的下限，避免 `RESCAN=0` 时空转
pub const MIN_INTERVAL_SECONDS: u64 = 1;

/// 被探测的端点
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// `host:port` 地址，取自行内第一个空白分隔的字段
    pub address: String,
    /// 地址之后的注释文本
    pub comment: Option<String>,
}

impl Endpoint {
    /// 创建不带注释的端点
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            comment: None,
        }
    }

    /// 解析端点列表中的一行
    ///
    /// 空行和以 `#` 开头的注释行返回 `None`
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let mut fields = trimmed.split_whitespace();
        let address = fields.next()?.to_string();
        let rest: Vec<&str> = fields.collect();
        let comment = if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        };

        Some(Self { address, comment })
    }

    /// 是否为应当跳过的条目（空地址或注释）
    pub fn is_placeholder(&self) -> bool {
        self.address.is_empty() || self.address.starts_with('#')
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}

/// 解析换行分隔的端点列表，保持原有顺序
pub fn parse_endpoint_list(content: &str) -> Vec<Endpoint> {
    content.lines().filter_map(Endpoint::parse_line).collect()
}

/// 指标导出配置
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsConfig {
    /// 指标命名空间
    pub namespace: String,
    /// 汇总指标名称
    pub name: String,
    /// 汇总指标说明
    pub help: String,
    /// 绑定地址
    pub bind_address: String,
    /// 监听端口
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: default_metrics_namespace(),
            name: default_metrics_name(),
            help: default_metrics_help(),
            bind_address: default_bind_address(),
            port: default_listen_port(),
        }
    }
}

impl MetricsConfig {
    /// 解析监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|_| {
                ConfigError::InvalidListenAddress(format!("{}:{}", self.bind_address, self.port))
            })
    }
}

/// 探测器主配置，启动时加载一次后不再修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeConfig {
    /// 单次连接超时（秒）
    pub timeout_seconds: u64,
    /// 本节点标识，出现在失败信息中
    pub node_id: String,
    /// 集群名称
    pub cluster_name: String,
    /// 告警 webhook 地址
    pub webhook_url: String,
    /// 两轮探测之间的间隔（秒）
    pub rescan_interval_seconds: u64,
    /// 端点列表
    pub endpoints: Vec<Endpoint>,
    /// 最大并发探测数，1 表示顺序探测
    pub max_concurrent_probes: usize,
    /// 是否在探测失败时发送告警
    pub alerts_enabled: bool,
    /// 自定义告警模板路径
    pub alert_template_path: Option<PathBuf>,
    /// 指标导出配置
    pub metrics: MetricsConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            node_id: String::new(),
            cluster_name: String::new(),
            webhook_url: String::new(),
            rescan_interval_seconds: default_rescan_interval(),
            endpoints: Vec::new(),
            max_concurrent_probes: default_max_concurrent(),
            alerts_enabled: false,
            alert_template_path: None,
            metrics: MetricsConfig::default(),
        }
    }
}

impl ProbeConfig {
    /// 实际使用的连接超时
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(MIN_INTERVAL_SECONDS))
    }

    /// 实际使用的重扫间隔
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.rescan_interval_seconds.max(MIN_INTERVAL_SECONDS))
    }

    /// 实际使用的并发度
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_probes.max(1)
    }

    /// 顺序探测时一轮可能的最长耗时
    pub fn worst_case_cycle(&self) -> Duration {
        let batches = self.endpoints.len().div_ceil(self.concurrency()) as u32;
        self.probe_timeout() * batches
    }

    /// 校验配置，返回警告列表
    ///
    /// 所有字段都有安全的默认值，因此这里只产生警告而不失败
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.endpoints.is_empty() {
            warnings.push("端点列表为空，每轮探测不会执行任何检查".to_string());
        }

        if self.timeout_seconds < MIN_INTERVAL_SECONDS {
            warnings.push(format!(
                "连接超时 {} 秒过短，已按 {} 秒执行",
                self.timeout_seconds, MIN_INTERVAL_SECONDS
            ));
        }

        if self.rescan_interval_seconds < MIN_INTERVAL_SECONDS {
            warnings.push(format!(
                "重扫间隔 {} 秒过短，已按 {} 秒执行",
                self.rescan_interval_seconds, MIN_INTERVAL_SECONDS
            ));
        }

        if self.worst_case_cycle() > self.rescan_interval() {
            warnings.push(format!(
                "最坏情况下一轮探测耗时 {:?} 超过重扫间隔 {:?}，探测周期会发生漂移",
                self.worst_case_cycle(),
                self.rescan_interval()
            ));
        }

        if self.alerts_enabled && self.webhook_url.is_empty() {
            warnings.push("已启用告警但未配置 WEBHOOKURL，告警将被忽略".to_string());
        }

        if self.metrics.port < 1024 {
            warnings.push(format!("监听端口 {} 为特权端口", self.metrics.port));
        }

        warnings
    }
}

// 默认值函数
pub(crate) fn default_timeout() -> u64 {
    1
}
pub(crate) fn default_rescan_interval() -> u64 {
    30
}
pub(crate) fn default_max_concurrent() -> usize {
    1
}
pub(crate) fn default_metrics_namespace() -> String {
    "strongswan".to_string()
}
pub(crate) fn default_metrics_name() -> String {
    "cassandratest".to_string()
}
pub(crate) fn default_metrics_help() -> String {
    "1 is connected, 0 is disconnected".to_string()
}
pub(crate) fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
pub(crate) fn default_listen_port() -> u16 {
    8080
}
