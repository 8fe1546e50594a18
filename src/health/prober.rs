//! TCP端口探测器实现
//!
//! 对 `host:port` 发起一次带超时的 TCP 连接，连接成功后立即关闭

use crate::config::Endpoint;
use crate::health::result::ProbeResult;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// 探测器trait，定义探测接口
#[async_trait]
pub trait Prober: Send + Sync {
    /// 使用默认超时探测端点
    ///
    /// 探测失败不会返回错误，而是体现在 `ProbeResult::failed` 中
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;

    /// 使用指定超时探测端点
    ///
    /// # 参数
    /// * `endpoint` - 端点
    /// * `timeout_duration` - 连接超时
    async fn probe_with_timeout(
        &self,
        endpoint: &Endpoint,
        timeout_duration: Duration,
    ) -> ProbeResult;
}

/// TCP端口探测器
#[derive(Debug, Clone)]
pub struct TcpProber {
    /// 默认超时时间
    default_timeout: Duration,
    /// 本节点标识
    node_id: String,
}

impl TcpProber {
    /// 创建新的TCP探测器
    ///
    /// # 参数
    /// * `timeout` - 默认连接超时
    /// * `node_id` - 写入失败信息的节点标识
    pub fn new(timeout: Duration, node_id: impl Into<String>) -> Self {
        Self {
            default_timeout: timeout,
            node_id: node_id.into(),
        }
    }

    /// 默认超时时间
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        self.probe_with_timeout(endpoint, self.default_timeout).await
    }

    async fn probe_with_timeout(
        &self,
        endpoint: &Endpoint,
        timeout_duration: Duration,
    ) -> ProbeResult {
        let address = endpoint.address.as_str();
        let start_time = Instant::now();

        // 地址解析也计入超时
        let outcome = timeout(timeout_duration, TcpStream::connect(address)).await;
        let elapsed = start_time.elapsed();

        match outcome {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeResult::success(address, elapsed)
            }
            Ok(Err(e)) => ProbeResult::failure(address, &self.node_id, e, elapsed),
            Err(_) => ProbeResult::failure(
                address,
                &self.node_id,
                format!("connect timed out after {}s", timeout_duration.as_secs_f64()),
                elapsed,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let prober = TcpProber::new(Duration::from_secs(1), "node-a");
        let result = prober.probe(&Endpoint::new(addr.to_string())).await;

        assert!(!result.failed, "unexpected failure: {}", result.message);
        assert_eq!(result.message, "Success");
        assert_eq!(result.endpoint, addr.to_string());
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // 先绑定再释放，得到一个当前无人监听的端口
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let prober = TcpProber::new(Duration::from_secs(1), "node-a");
        let result = prober.probe(&Endpoint::new(addr.to_string())).await;

        assert!(result.failed);
        assert!(result.message.contains(&addr.to_string()));
        assert!(result.message.contains("Node(node-a) Error: No Connection to"));
    }

    #[tokio::test]
    async fn test_probe_deadline_exceeded() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // 连接首次轮询总是挂起，零超时必然先到期
        let prober = TcpProber::new(Duration::from_secs(1), "node-a");
        let result = prober
            .probe_with_timeout(&Endpoint::new(addr.to_string()), Duration::ZERO)
            .await;

        assert!(result.failed);
        assert!(result.message.contains("timed out"), "{}", result.message);
        assert!(result.message.contains(&format!("No Connection to '{addr}'")));
    }

    #[tokio::test]
    async fn test_probe_malformed_address() {
        let prober = TcpProber::new(Duration::from_secs(1), "");
        let result = prober.probe(&Endpoint::new("no-port-here")).await;

        assert!(result.failed);
        assert!(result.message.contains("'no-port-here'"));
        assert!(result.message.contains("Node()"));
    }

    #[test]
    fn test_default_timeout() {
        let prober = TcpProber::new(Duration::from_secs(3), "n");
        assert_eq!(prober.default_timeout(), Duration::from_secs(3));
    }
}
