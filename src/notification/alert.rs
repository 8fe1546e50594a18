//! 探测失败告警
//!
//! 把失败的探测结果渲染成告警消息并交给通知发送器

use crate::config::{Endpoint, ProbeConfig};
use crate::error::{ConfigError, NotificationError};
use crate::health::ProbeResult;
use crate::notification::sender::{NoOpNotifier, Notifier};
use crate::notification::template::{AlertTemplate, TemplateContext};
use crate::notification::webhook::WebhookNotifier;
use std::sync::Arc;
use tracing::{debug, info};

/// 探测失败告警器
pub struct ProbeAlerter {
    template: AlertTemplate,
    notifier: Arc<dyn Notifier>,
    node_ip: String,
    cluster_name: String,
}

impl ProbeAlerter {
    /// 创建告警器
    pub fn new(
        template: AlertTemplate,
        notifier: Arc<dyn Notifier>,
        node_ip: impl Into<String>,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            template,
            notifier,
            node_ip: node_ip.into(),
            cluster_name: cluster_name.into(),
        }
    }

    /// 按配置构建告警器
    ///
    /// 未启用告警时返回 `None`；启用但未配置 webhook 时使用空发送器。
    /// 模板在这里编译，错误在启动阶段暴露
    pub fn from_config(config: &ProbeConfig) -> Result<Option<Self>, ConfigError> {
        if !config.alerts_enabled {
            debug!("告警未启用");
            return Ok(None);
        }

        let template = match &config.alert_template_path {
            Some(path) => AlertTemplate::from_file(path)?,
            None => AlertTemplate::builtin()?,
        };

        let notifier: Arc<dyn Notifier> = if config.webhook_url.trim().is_empty() {
            Arc::new(NoOpNotifier)
        } else {
            let notifier = WebhookNotifier::new(config.webhook_url.clone())
                .map_err(|e| ConfigError::Notifier(e.to_string()))?;
            Arc::new(notifier)
        };

        info!("告警已启用，发送器: {}", notifier.name());

        Ok(Some(Self::new(
            template,
            notifier,
            config.node_id.clone(),
            config.cluster_name.clone(),
        )))
    }

    /// 构造模板上下文
    pub fn context_for(&self, endpoint: &Endpoint, result: &ProbeResult) -> TemplateContext {
        TemplateContext {
            node_ip: self.node_ip.clone(),
            cluster_name: self.cluster_name.clone(),
            comment: endpoint.comment.clone().unwrap_or_default(),
            host_port: endpoint.address.clone(),
            errmsg: result.message.clone(),
        }
    }

    /// 渲染并发送一条告警
    pub async fn alert(
        &self,
        endpoint: &Endpoint,
        result: &ProbeResult,
    ) -> Result<(), NotificationError> {
        let payload = self.template.render(&self.context_for(endpoint, result))?;
        self.notifier.notify(&payload).await
    }
}

impl std::fmt::Debug for ProbeAlerter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeAlerter")
            .field("notifier", &self.notifier.name())
            .field("node_ip", &self.node_ip)
            .field("cluster_name", &self.cluster_name)
            .finish()
    }
}
