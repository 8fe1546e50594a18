//! Prometheus指标模块
//!
//! 持有探测相关的全部指标，调度器写入，导出端只读

use crate::config::MetricsConfig;
use crate::health::ProbeResult;
use prometheus::{
    Encoder, Gauge, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
    Registry, TextEncoder,
};

/// Prometheus指标收集器
pub struct MetricsCollector {
    /// 注册表
    registry: Registry,
    /// 汇总状态：最近一次应用的探测结果（1=可连接，0=不可连接）
    up: Gauge,
    /// 每个端点的状态
    endpoint_up: GaugeVec,
    /// 探测次数计数器
    probes_total: IntCounterVec,
    /// 连接耗时直方图
    probe_duration: HistogramVec,
    /// 抓取请求计数器
    scrape_requests: IntCounter,
}

impl MetricsCollector {
    /// 创建新的指标收集器
    ///
    /// 指标名称非法时返回错误，应在启动阶段处理
    pub fn new(config: &MetricsConfig) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let namespace = config.namespace.as_str();

        let up = Gauge::with_opts(
            Opts::new(config.name.clone(), config.help.clone()).namespace(namespace),
        )?;

        let endpoint_up = GaugeVec::new(
            Opts::new(
                format!("{}_endpoint_up", config.name),
                "Whether the endpoint accepted a TCP connection (1) or not (0)",
            )
            .namespace(namespace),
            &["endpoint"],
        )?;

        let probes_total = IntCounterVec::new(
            Opts::new(
                format!("{}_probes_total", config.name),
                "Total number of TCP probes performed",
            )
            .namespace(namespace),
            &["endpoint", "result"],
        )?;

        let probe_duration = HistogramVec::new(
            HistogramOpts::new(
                format!("{}_probe_duration_seconds", config.name),
                "Time spent establishing the TCP connection in seconds",
            )
            .namespace(namespace)
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["endpoint"],
        )?;

        let scrape_requests = IntCounter::with_opts(
            Opts::new(
                "scrape_requests_total",
                "Total number of scrapes served by the metrics endpoint",
            )
            .namespace(namespace),
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(endpoint_up.clone()))?;
        registry.register(Box::new(probes_total.clone()))?;
        registry.register(Box::new(probe_duration.clone()))?;
        registry.register(Box::new(scrape_requests.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            up,
            endpoint_up,
            probes_total,
            probe_duration,
            scrape_requests,
        })
    }

    /// 应用一次探测结果
    pub fn record_probe(&self, result: &ProbeResult) {
        let status = result.status();
        let endpoint = result.endpoint.as_str();

        self.up.set(status.gauge_value());
        self.endpoint_up
            .with_label_values(&[endpoint])
            .set(status.gauge_value());
        self.probes_total
            .with_label_values(&[endpoint, status.as_label()])
            .inc();
        self.probe_duration
            .with_label_values(&[endpoint])
            .observe(result.response_time.as_secs_f64());
    }

    /// 记录一次抓取请求
    pub fn record_scrape(&self) {
        self.scrape_requests.inc();
    }

    /// 汇总 gauge 的当前值
    pub fn up_value(&self) -> f64 {
        self.up.get()
    }

    /// 已服务的抓取请求数
    pub fn scrape_count(&self) -> u64 {
        self.scrape_requests.get()
    }

    /// 获取Prometheus文本格式的指标
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("up", &self.up.get())
            .field("scrape_requests", &self.scrape_requests.get())
            .finish()
    }
}
