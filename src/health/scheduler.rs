//! 轮询调度器模块
//!
//! 按 RESCAN 间隔循环探测全部端点，把结果写入指标并在失败时触发告警

use crate::config::{Endpoint, ProbeConfig};
use crate::health::prober::Prober;
use crate::health::result::{CycleSummary, ProbeResult};
use crate::notification::ProbeAlerter;
use crate::web::metrics::MetricsCollector;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock, Semaphore};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// 调度器状态
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    /// 调度器是否运行中
    pub is_running: bool,
    /// 已完成的轮次
    pub cycles_completed: u64,
    /// 最近一轮的汇总
    pub last_cycle: Option<CycleSummary>,
}

/// 轮询调度器
pub struct PollScheduler {
    /// 端口探测器
    prober: Arc<dyn Prober>,
    /// 指标收集器
    metrics: Arc<MetricsCollector>,
    /// 告警器（可选）
    alerter: Option<Arc<ProbeAlerter>>,
    /// 按配置顺序排列的端点
    endpoints: Vec<Endpoint>,
    /// 两轮之间的休眠时间
    rescan_interval: Duration,
    /// 单轮最大并发探测数
    concurrency: usize,
    /// 并发控制信号量
    semaphore: Arc<Semaphore>,
    /// 调度器状态
    status: Arc<RwLock<SchedulerStatus>>,
}

impl PollScheduler {
    /// 创建新的轮询调度器
    ///
    /// # 参数
    /// * `config` - 探测配置
    /// * `prober` - 端口探测器
    /// * `metrics` - 指标收集器
    pub fn new(
        config: &ProbeConfig,
        prober: Arc<dyn Prober>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let concurrency = config.concurrency();

        Self {
            prober,
            metrics,
            alerter: None,
            endpoints: config.endpoints.clone(),
            rescan_interval: config.rescan_interval(),
            concurrency,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
        }
    }

    /// 设置告警器
    pub fn with_alerter(mut self, alerter: Option<Arc<ProbeAlerter>>) -> Self {
        self.alerter = alerter;
        self
    }

    /// 两轮之间的休眠时间
    pub fn rescan_interval(&self) -> Duration {
        self.rescan_interval
    }

    /// 获取调度器状态
    pub async fn get_status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }

    /// 执行一轮探测
    ///
    /// 结果按端点的配置顺序写入指标，汇总 gauge 反映本轮最后一个端点。
    /// 单个端点失败不会中断本轮
    pub async fn run_cycle(&self) -> CycleSummary {
        let start_time = Instant::now();

        let targets: Vec<&Endpoint> = self
            .endpoints
            .iter()
            .filter(|endpoint| {
                if endpoint.is_placeholder() {
                    debug!("跳过占位端点: {:?}", endpoint.address);
                    false
                } else {
                    true
                }
            })
            .collect();

        if targets.is_empty() {
            debug!("端点列表为空，本轮跳过");
        }

        let results = if self.concurrency <= 1 {
            self.probe_sequential(&targets).await
        } else {
            self.probe_concurrent(&targets).await
        };

        // 告警在全部端点探测并写入指标之后统一发送
        self.send_alerts(&targets, &results).await;

        let summary = CycleSummary {
            results,
            elapsed: start_time.elapsed(),
        };

        debug!(
            "本轮探测完成: 共{}个, 成功{}个, 失败{}个, 耗时{}ms",
            summary.probed(),
            summary.succeeded(),
            summary.failed(),
            summary.elapsed.as_millis()
        );

        let mut status = self.status.write().await;
        status.cycles_completed += 1;
        status.last_cycle = Some(summary.clone());

        summary
    }

    /// 逐个探测，每个结果立即生效
    async fn probe_sequential(&self, targets: &[&Endpoint]) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(targets.len());
        for endpoint in targets {
            info!("Checking {}", endpoint);
            let result = self.prober.probe(endpoint).await;
            self.record_result(&result);
            results.push(result);
        }
        results
    }

    /// 受信号量限制并发探测，全部完成后按配置顺序生效
    async fn probe_concurrent(&self, targets: &[&Endpoint]) -> Vec<ProbeResult> {
        let probes = targets.iter().map(|endpoint| async move {
            // 信号量不会被关闭，获取失败时不限流
            let _permit = self.semaphore.acquire().await.ok();
            info!("Checking {}", endpoint);
            self.prober.probe(endpoint).await
        });

        let results = join_all(probes).await;
        for result in &results {
            self.record_result(result);
        }
        results
    }

    /// 写入指标并记录结果
    fn record_result(&self, result: &ProbeResult) {
        self.metrics.record_probe(result);

        if result.failed {
            warn!("{}", result.message);
        } else {
            info!(
                "{} - {} ({}ms)",
                result.endpoint,
                result.message,
                result.response_time_ms()
            );
        }
    }

    /// 为本轮失败的端点并发发送告警，发送失败只记录日志
    async fn send_alerts(&self, targets: &[&Endpoint], results: &[ProbeResult]) {
        let Some(alerter) = &self.alerter else {
            return;
        };

        let alerts = targets
            .iter()
            .zip(results)
            .filter(|(_, result)| result.failed)
            .map(|(endpoint, result)| async move {
                match alerter.alert(endpoint, result).await {
                    Ok(()) => info!("告警已发送: {}", endpoint.address),
                    Err(e) => error!("告警发送失败: {} - {}", endpoint.address, e),
                }
            });

        join_all(alerts).await;
    }

    /// 运行轮询循环直到收到关闭信号
    ///
    /// 每轮结束后休眠 `rescan_interval`，因此实际周期为本轮耗时加上间隔。
    /// 进行中的轮次不会被等待完成
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "轮询调度器启动: {}个端点, 间隔{}s, 并发{}",
            self.endpoints.len(),
            self.rescan_interval.as_secs(),
            self.concurrency
        );
        self.status.write().await.is_running = true;

        loop {
            // 关闭信号同样会打断进行中的一轮
            let summary = tokio::select! {
                summary = self.run_cycle() => summary,
                _ = shutdown.recv() => {
                    info!("收到关闭信号，放弃当前轮次，轮询调度器停止");
                    break;
                }
            };

            if summary.elapsed > self.rescan_interval {
                warn!(
                    "本轮探测耗时{}ms，超过扫描间隔{}s，采样周期出现漂移",
                    summary.elapsed.as_millis(),
                    self.rescan_interval.as_secs()
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(self.rescan_interval) => {}
                _ = shutdown.recv() => {
                    info!("收到关闭信号，轮询调度器停止");
                    break;
                }
            }
        }

        self.status.write().await.is_running = false;
    }
}

impl std::fmt::Debug for PollScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollScheduler")
            .field("endpoints", &self.endpoints.len())
            .field("rescan_interval", &self.rescan_interval)
            .field("concurrency", &self.concurrency)
            .field("alerts", &self.alerter.is_some())
            .finish()
    }
}
