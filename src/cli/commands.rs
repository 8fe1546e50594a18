//! 命令处理逻辑
//!
//! 实现 run 和 check 两个命令

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{EnvConfigLoader, ProbeConfig};
use crate::error::{PortVitalsError, Result};
use crate::health::{CycleSummary, PollScheduler, TcpProber};
use crate::notification::ProbeAlerter;
use crate::web::{MetricsCollector, MetricsServer};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 从环境变量加载配置并输出校验警告
pub fn load_config() -> ProbeConfig {
    let config = EnvConfigLoader::from_env().load();
    for warning in config.validate() {
        warn!("配置警告: {}", warning);
    }
    config
}

/// 按配置组装指标收集器和调度器
///
/// 指标名非法或告警模板无效时返回错误
pub fn build_scheduler(config: &ProbeConfig) -> Result<(PollScheduler, Arc<MetricsCollector>)> {
    let metrics = Arc::new(MetricsCollector::new(&config.metrics)?);
    let prober = Arc::new(TcpProber::new(
        config.probe_timeout(),
        config.node_id.clone(),
    ));
    let alerter = ProbeAlerter::from_config(config)?.map(Arc::new);

    let scheduler = PollScheduler::new(config, prober, metrics.clone()).with_alerter(alerter);
    Ok((scheduler, metrics))
}

/// 持续运行命令
pub struct RunCommand;

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self, _args: &Args) -> Result<()> {
        let config = load_config();
        info!(
            "加载了{}个端点, 超时{}s, 间隔{}s",
            config.endpoints.len(),
            config.probe_timeout().as_secs(),
            config.rescan_interval().as_secs()
        );

        let (scheduler, metrics) = build_scheduler(&config)?;
        let server = MetricsServer::new(config.metrics.clone(), metrics);

        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let scheduler_rx = shutdown_tx.subscribe();
        let scheduler_handle = tokio::spawn(async move { scheduler.run(scheduler_rx).await });

        let signal_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            let _ = signal_tx.send(());
        });

        let server_result = server.run(shutdown_tx.subscribe()).await;

        // 服务器退出（正常关闭或绑定失败）后停止调度器
        let _ = shutdown_tx.send(());
        if let Err(e) = scheduler_handle.await {
            error!("调度任务异常退出: {}", e);
        }

        server_result
    }
}

/// 一次性检测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let format = match args.effective_command() {
            Commands::Check { format } => format,
            Commands::Run => OutputFormat::Text,
        };

        let config = load_config();
        let (scheduler, _metrics) = build_scheduler(&config)?;

        if config.endpoints.is_empty() {
            eprintln!("未配置任何端点，请设置 ENDPOINTS 或 ENDPOINTS_FILE");
            return Ok(());
        }

        let summary = scheduler.run_cycle().await;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary.results)?);
            }
            OutputFormat::Text => print_text_results(&summary),
        }

        if summary.all_up() {
            Ok(())
        } else {
            Err(PortVitalsError::EndpointsDown(summary.failed()))
        }
    }
}

/// 打印文本格式结果
fn print_text_results(summary: &CycleSummary) {
    for result in &summary.results {
        let status_icon = if result.failed { "✗" } else { "✓" };
        println!(
            "{} {} - {} ({}ms)",
            status_icon,
            result.endpoint,
            result.status(),
            result.response_time_ms()
        );
        if result.failed {
            println!("  {}", result.message);
        }
    }
    println!(
        "\n共{}个端点, 可连接{}个, 不可连接{}个",
        summary.probed(),
        summary.succeeded(),
        summary.failed()
    );
}

/// 等待 ctrl-c 或 SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("监听中断信号失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("监听SIGTERM失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到中断信号，正在停止服务..."),
        _ = terminate => info!("收到SIGTERM，正在停止服务..."),
    }
}
