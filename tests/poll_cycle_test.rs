//! 轮询周期集成测试
//!
//! 使用真实的本地 TcpListener 验证探测、指标和配置加载的整体行为

use port_vitals::config::EnvConfigLoader;
use port_vitals::health::{PollScheduler, Prober, TcpProber};
use port_vitals::{Endpoint, MetricsCollector, ProbeConfig};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// 启动一个持续接受连接的本地监听器
async fn open_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    addr
}

/// 获取一个当前没有监听的本地端口
fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn scheduler_for(endpoints: Vec<String>) -> (PollScheduler, Arc<MetricsCollector>) {
    let config = ProbeConfig {
        endpoints: endpoints.into_iter().map(Endpoint::new).collect(),
        ..Default::default()
    };
    let metrics = Arc::new(MetricsCollector::new(&config.metrics).unwrap());
    let prober = Arc::new(TcpProber::new(config.probe_timeout(), "it-node"));
    (
        PollScheduler::new(&config, prober, metrics.clone()),
        metrics,
    )
}

#[tokio::test]
async fn test_probe_listening_socket_succeeds() {
    let addr = open_port().await;
    let prober = TcpProber::new(Duration::from_secs(1), "it-node");

    let result = prober.probe(&Endpoint::new(addr.to_string())).await;
    assert!(!result.failed, "unexpected failure: {}", result.message);
    assert_eq!(result.message, "Success");
}

#[tokio::test]
async fn test_probe_closed_port_fails_with_address() {
    let addr = closed_port();
    let prober = TcpProber::new(Duration::from_secs(1), "it-node");

    let result = prober.probe(&Endpoint::new(addr.to_string())).await;
    assert!(result.failed);
    assert!(result.message.contains(&addr.to_string()));
    assert!(result.message.contains("Node(it-node)"));
}

#[tokio::test]
async fn test_gauge_follows_last_endpoint() {
    let open = open_port().await.to_string();
    let closed = closed_port().to_string();

    let (scheduler, metrics) = scheduler_for(vec![open.clone(), closed.clone()]);
    let summary = scheduler.run_cycle().await;
    assert_eq!(summary.failed(), 1);
    assert_eq!(metrics.up_value(), 0.0);

    let (scheduler, metrics) = scheduler_for(vec![closed, open]);
    let summary = scheduler.run_cycle().await;
    assert_eq!(summary.failed(), 1);
    assert_eq!(metrics.up_value(), 1.0);
}

#[tokio::test]
async fn test_env_loaded_endpoints_drive_cycle() {
    let open = open_port().await;
    let closed = closed_port();

    let env: HashMap<String, String> = [
        (
            "ENDPOINTS".to_string(),
            format!("# cassandra ring\n\n{open} seed node\n   \n{closed} decommissioned\n"),
        ),
        ("NODEIP".to_string(), "10.1.2.3".to_string()),
        ("TIMEOUT".to_string(), "2".to_string()),
    ]
    .into_iter()
    .collect();

    let config = EnvConfigLoader::new(env).load();
    assert_eq!(config.endpoints.len(), 2);
    assert_eq!(config.endpoints[0].comment.as_deref(), Some("seed node"));

    let metrics = Arc::new(MetricsCollector::new(&config.metrics).unwrap());
    let prober = Arc::new(TcpProber::new(config.probe_timeout(), config.node_id.clone()));
    let scheduler = PollScheduler::new(&config, prober, metrics.clone());

    let summary = scheduler.run_cycle().await;
    assert_eq!(summary.probed(), 2);
    assert!(!summary.results[0].failed);
    assert!(summary.results[1].message.contains("Node(10.1.2.3)"));
    assert_eq!(metrics.up_value(), 0.0);
}

#[tokio::test]
async fn test_empty_endpoints_env_is_noop() {
    let env: HashMap<String, String> = [("ENDPOINTS".to_string(), String::new())]
        .into_iter()
        .collect();
    let config = EnvConfigLoader::new(env).load();
    assert!(config.endpoints.is_empty());

    let (scheduler, _metrics) = scheduler_for(Vec::new());
    let summary = scheduler.run_cycle().await;
    assert_eq!(summary.probed(), 0);
    assert!(summary.all_up());
}
