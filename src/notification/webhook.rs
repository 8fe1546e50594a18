//! Webhook通知发送器模块
//!
//! 以 `application/json` POST 消息体到配置的 webhook 地址

use crate::error::NotificationError;
use crate::notification::sender::Notifier;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// webhook 请求超时
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook通知发送器
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    /// HTTP客户端
    client: Client,
    /// webhook URL
    webhook_url: String,
}

impl WebhookNotifier {
    /// 创建新的webhook发送器
    ///
    /// # 参数
    /// * `webhook_url` - webhook URL，不能为空
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotificationError> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(NotificationError::ConfigError(
                "webhook URL 不能为空".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(|e| NotificationError::ConfigError(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// webhook URL
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &str) -> Result<(), NotificationError> {
        debug!("发送告警到webhook: {}", self.webhook_url);

        let response = self
            .client
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| NotificationError::SendError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            error!("webhook返回错误: {} - {}", status, text);
            Err(NotificationError::SendError(format!("HTTP {status}")))
        }
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(
            WebhookNotifier::new("  "),
            Err(NotificationError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_notify_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(r#"{"text":"down"}"#)
            .with_status(200)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url())).unwrap();
        notifier.notify(r#"{"text":"down"}"#).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_notify_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url())).unwrap();
        let err = notifier.notify("{}").await.unwrap_err();

        assert!(matches!(err, NotificationError::SendError(ref msg) if msg.contains("500")));
    }
}
