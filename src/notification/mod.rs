//! 通知模块
//!
//! 提供 webhook 告警发送和消息模板功能

pub mod alert;
pub mod sender;
pub mod template;
pub mod webhook;

// 重新导出主要类型
pub use alert::ProbeAlerter;
pub use sender::{NoOpNotifier, Notifier};
pub use template::{AlertTemplate, TemplateContext};
pub use webhook::WebhookNotifier;
