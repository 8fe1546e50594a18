//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Port Vitals 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum PortVitalsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// 指标注册或编码错误
    #[error("指标错误: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 一次性检测发现不可连接的端点
    #[error("{0}个端点不可连接")]
    EndpointsDown(usize),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 告警模板文件读取失败
    #[error("告警模板文件读取失败: {path}")]
    TemplateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 告警模板语法错误
    #[error("告警模板解析失败: {0}")]
    Template(String),

    /// 告警发送器配置错误
    #[error("告警发送器配置失败: {0}")]
    Notifier(String),

    /// 监听地址无效
    #[error("无效的监听地址: {0}")]
    InvalidListenAddress(String),
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 发送失败
    #[error("通知发送失败: {0}")]
    SendError(String),

    /// 模板渲染错误
    #[error("模板渲染失败: {0}")]
    TemplateError(String),

    /// 配置错误
    #[error("通知配置错误: {0}")]
    ConfigError(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, PortVitalsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_wraps_into_top_level() {
        let err: PortVitalsError = ConfigError::Template("unclosed block".to_string()).into();
        assert!(err.to_string().contains("unclosed block"));
        assert!(matches!(err, PortVitalsError::Config(_)));
    }

    #[test]
    fn test_notification_error_display() {
        let err = NotificationError::SendError("HTTP 500".to_string());
        assert_eq!(err.to_string(), "通知发送失败: HTTP 500");
    }

    #[test]
    fn test_endpoints_down_display() {
        assert_eq!(PortVitalsError::EndpointsDown(2).to_string(), "2个端点不可连接");
    }
}
