//! 端点处理基准测试
//!
//! 测试端点列表解析、指标写入和告警模板渲染的性能

use criterion::{criterion_group, criterion_main, Criterion};
use port_vitals::config::{parse_endpoint_list, MetricsConfig};
use port_vitals::notification::{AlertTemplate, TemplateContext};
use port_vitals::{MetricsCollector, ProbeResult};
use std::hint::black_box;
use std::time::Duration;

/// 生成带注释和空行的端点列表
fn endpoint_list(count: usize) -> String {
    let mut content = String::from("# generated endpoint list\n\n");
    for i in 0..count {
        content.push_str(&format!("10.0.{}.{}:9042 cassandra node {}\n", i / 256, i % 256, i));
        if i % 10 == 0 {
            content.push_str("# rack boundary\n   \n");
        }
    }
    content
}

/// 端点处理基准测试
fn endpoint_parsing_benchmark(c: &mut Criterion) {
    let small = endpoint_list(10);
    let large = endpoint_list(1000);

    c.bench_function("parse_endpoints_10", |b| {
        b.iter(|| black_box(parse_endpoint_list(black_box(&small))))
    });

    c.bench_function("parse_endpoints_1000", |b| {
        b.iter(|| black_box(parse_endpoint_list(black_box(&large))))
    });

    let collector = MetricsCollector::new(&MetricsConfig::default()).unwrap();
    let results: Vec<ProbeResult> = (0..50)
        .map(|i| {
            let endpoint = format!("10.0.0.{i}:9042");
            if i % 7 == 0 {
                ProbeResult::failure(endpoint, "bench", "refused", Duration::from_millis(2))
            } else {
                ProbeResult::success(endpoint, Duration::from_millis(1))
            }
        })
        .collect();

    c.bench_function("record_cycle_50", |b| {
        b.iter(|| {
            for result in &results {
                collector.record_probe(black_box(result));
            }
        })
    });

    c.bench_function("gather_metrics_50", |b| {
        b.iter(|| black_box(collector.gather_metrics().unwrap()))
    });

    let template = AlertTemplate::builtin().unwrap();
    let context = TemplateContext {
        node_ip: "10.0.0.7".to_string(),
        cluster_name: "prod-eu".to_string(),
        comment: "cassandra seed".to_string(),
        host_port: "db-1:9042".to_string(),
        errmsg: "2024-01-01-00:00:00 Node(10.0.0.7) Error: No Connection to 'db-1:9042' -- refused"
            .to_string(),
    };

    c.bench_function("render_alert_template", |b| {
        b.iter(|| black_box(template.render(black_box(&context)).unwrap()))
    });
}

criterion_group!(benches, endpoint_parsing_benchmark);
criterion_main!(benches);
