//! 通知发送器模块
//!
//! 定义通知发送的trait和空实现

use crate::error::NotificationError;
use async_trait::async_trait;

/// 通知发送器trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送已渲染好的消息体
    ///
    /// # 参数
    /// * `payload` - JSON 消息体
    ///
    /// # 返回
    /// * `Result<(), NotificationError>` - 发送结果
    async fn notify(&self, payload: &str) -> Result<(), NotificationError>;

    /// 发送器名称，用于日志
    fn name(&self) -> &'static str;
}

/// 空的通知发送器实现（告警关闭时使用）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _payload: &str) -> Result<(), NotificationError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_notifier_always_succeeds() {
        let notifier = NoOpNotifier;
        assert!(notifier.notify("{}").await.is_ok());
        assert_eq!(notifier.name(), "noop");
    }
}
