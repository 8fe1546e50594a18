//! 告警消息模板模块
//!
//! 使用 Handlebars 渲染 JSON 告警消息体，模板在启动时编译并校验

use crate::error::{ConfigError, NotificationError};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

const TEMPLATE_NAME: &str = "alert";

/// 内置的 Teams MessageCard 告警模板
pub const DEFAULT_ALERT_TEMPLATE: &str = r#"{
  "@type": "MessageCard",
  "@context": "http://schema.org/extensions",
  "themeColor": "d70000",
  "summary": "Port check failed on {{cluster_name}}",
  "sections": [
    {
      "activityTitle": "Port check failed: {{host_port}}",
      "facts": [
        { "name": "Cluster", "value": "{{cluster_name}}" },
        { "name": "Node", "value": "{{node_ip}}" },
        { "name": "Endpoint", "value": "{{host_port}}" },
        { "name": "Comment", "value": "{{comment}}" }
      ],
      "text": "{{errmsg}}"
    }
  ]
}"#;

/// 模板上下文数据
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateContext {
    /// 节点标识
    pub node_ip: String,
    /// 集群名称
    pub cluster_name: String,
    /// 端点注释
    pub comment: String,
    /// 端点地址
    pub host_port: String,
    /// 失败信息
    pub errmsg: String,
}

/// 已编译的告警模板
pub struct AlertTemplate {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for AlertTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertTemplate").finish_non_exhaustive()
    }
}

impl AlertTemplate {
    /// 编译模板字符串
    ///
    /// 模板语法错误或渲染结果不是合法 JSON 时返回错误
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        let mut registry = Handlebars::new();
        // 变量写在 JSON 字符串里，按 JSON 规则转义
        registry.register_escape_fn(json_escape);
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| ConfigError::Template(e.to_string()))?;

        let template = Self { registry };
        template.validate()?;
        Ok(template)
    }

    /// 使用内置模板
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(DEFAULT_ALERT_TEMPLATE)
    }

    /// 从文件加载模板
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::TemplateFile {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::new(&source)
    }

    /// 渲染模板
    pub fn render(&self, context: &TemplateContext) -> Result<String, NotificationError> {
        self.registry
            .render(TEMPLATE_NAME, context)
            .map_err(|e| NotificationError::TemplateError(e.to_string()))
    }

    /// 用带特殊字符的样例数据试渲染一次，确保输出是合法 JSON
    fn validate(&self) -> Result<(), ConfigError> {
        let sample = TemplateContext {
            node_ip: "10.0.0.1".to_string(),
            cluster_name: "validation".to_string(),
            comment: "quote \" and backslash \\".to_string(),
            host_port: "example:1".to_string(),
            errmsg: "line one\nline two".to_string(),
        };

        let rendered = self
            .render(&sample)
            .map_err(|e| ConfigError::Template(e.to_string()))?;

        serde_json::from_str::<serde_json::Value>(&rendered)
            .map_err(|e| ConfigError::Template(format!("渲染结果不是合法JSON: {e}")))?;

        Ok(())
    }
}

/// 按 JSON 字符串规则转义，不带外层引号
fn json_escape(data: &str) -> String {
    let quoted = serde_json::Value::String(data.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn context() -> TemplateContext {
        TemplateContext {
            node_ip: "10.0.0.7".to_string(),
            cluster_name: "prod-eu".to_string(),
            comment: "cassandra seed".to_string(),
            host_port: "db-1:9042".to_string(),
            errmsg: "2024-01-01-00:00:00 Node(10.0.0.7) Error: No Connection to 'db-1:9042' -- \"refused\"".to_string(),
        }
    }

    #[test]
    fn test_builtin_template_renders_valid_json() {
        let template = AlertTemplate::builtin().unwrap();
        let rendered = template.render(&context()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["summary"], "Port check failed on prod-eu");
        assert_eq!(value["sections"][0]["facts"][2]["value"], "db-1:9042");
        assert!(value["sections"][0]["text"]
            .as_str()
            .unwrap()
            .ends_with("\"refused\""));
    }

    #[test]
    fn test_malformed_template_rejected_at_construction() {
        let result = AlertTemplate::new(r#"{"text": "{{#if errmsg}}unclosed"}"#);
        assert!(matches!(result, Err(ConfigError::Template(_))));
    }

    #[test]
    fn test_non_json_template_rejected() {
        let result = AlertTemplate::new("Endpoint {{host_port}} is down");
        assert!(matches!(result, Err(ConfigError::Template(ref msg)) if msg.contains("JSON")));
    }

    #[test]
    fn test_template_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"text": "{{{{host_port}}}} on {{{{node_ip}}}}"}}"#).unwrap();

        let template = AlertTemplate::from_file(file.path()).unwrap();
        let rendered = template.render(&context()).unwrap();
        assert_eq!(rendered, r#"{"text": "db-1:9042 on 10.0.0.7"}"#);
    }

    #[test]
    fn test_missing_template_file() {
        let result = AlertTemplate::from_file(Path::new("/nonexistent/teams-alert.json"));
        assert!(matches!(result, Err(ConfigError::TemplateFile { .. })));
    }

    #[test]
    fn test_json_escape() {
        assert_eq!(json_escape(r#"a "b" \c"#), r#"a \"b\" \\c"#);
        assert_eq!(json_escape("x\ny"), r"x\ny");
    }
}
