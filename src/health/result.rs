//! 探测结果数据结构
//!
//! 定义单次探测结果和一轮探测的汇总

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// 失败信息中时间戳的格式
pub const MESSAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// 成功探测的固定信息
pub const SUCCESS_MESSAGE: &str = "Success";

/// 端点状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// 可连接
    Up,
    /// 不可连接
    Down,
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Up => write!(f, "正常"),
            ProbeStatus::Down => write!(f, "异常"),
        }
    }
}

impl ProbeStatus {
    /// 指标标签值
    pub fn as_label(&self) -> &'static str {
        match self {
            ProbeStatus::Up => "up",
            ProbeStatus::Down => "down",
        }
    }

    /// 对应的 gauge 值
    pub fn gauge_value(&self) -> f64 {
        match self {
            ProbeStatus::Up => 1.0,
            ProbeStatus::Down => 0.0,
        }
    }
}

/// 单次探测结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// 探测ID
    pub id: Uuid,
    /// 被探测的 `host:port`
    pub endpoint: String,
    /// 是否失败
    pub failed: bool,
    /// 带时间戳的诊断信息，成功时为 `Success`
    pub message: String,
    /// 探测时间
    pub timestamp: DateTime<Utc>,
    /// 连接耗时
    #[serde(with = "duration_serde")]
    pub response_time: Duration,
}

impl ProbeResult {
    /// 创建成功结果
    pub fn success(endpoint: impl Into<String>, response_time: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint: endpoint.into(),
            failed: false,
            message: SUCCESS_MESSAGE.to_string(),
            timestamp: Utc::now(),
            response_time,
        }
    }

    /// 创建失败结果
    ///
    /// # 参数
    /// * `endpoint` - 被探测的地址
    /// * `node_id` - 本节点标识
    /// * `error` - 底层错误描述
    /// * `response_time` - 失败前的耗时
    pub fn failure(
        endpoint: impl Into<String>,
        node_id: &str,
        error: impl std::fmt::Display,
        response_time: Duration,
    ) -> Self {
        let endpoint = endpoint.into();
        let timestamp = Utc::now();
        let message = format!(
            "{} Node({}) Error: No Connection to '{}' -- {}",
            timestamp
                .with_timezone(&Local)
                .format(MESSAGE_TIMESTAMP_FORMAT),
            node_id,
            endpoint,
            error
        );

        Self {
            id: Uuid::new_v4(),
            endpoint,
            failed: true,
            message,
            timestamp,
            response_time,
        }
    }

    /// 端点状态
    pub fn status(&self) -> ProbeStatus {
        if self.failed {
            ProbeStatus::Down
        } else {
            ProbeStatus::Up
        }
    }

    /// 连接耗时（毫秒）
    pub fn response_time_ms(&self) -> u64 {
        self.response_time.as_millis() as u64
    }
}

/// 一轮探测的汇总
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    /// 按配置顺序排列的探测结果
    pub results: Vec<ProbeResult>,
    /// 本轮耗时
    pub elapsed: Duration,
}

impl CycleSummary {
    /// 实际探测的端点数
    pub fn probed(&self) -> usize {
        self.results.len()
    }

    /// 失败的端点数
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.failed).count()
    }

    /// 成功的端点数
    pub fn succeeded(&self) -> usize {
        self.probed() - self.failed()
    }

    /// 本轮最后应用的结果状态，未探测时为 `None`
    pub fn last_status(&self) -> Option<ProbeStatus> {
        self.results.last().map(ProbeResult::status)
    }

    /// 是否全部成功（空轮次也视为成功）
    pub fn all_up(&self) -> bool {
        self.failed() == 0
    }
}

/// Duration序列化模块
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
