//! Web 路由处理函数

use super::MetricsState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

/// Prometheus 抓取处理函数
///
/// 只读取注册表，不触发探测
pub async fn metrics(State(state): State<MetricsState>) -> Response {
    state.collector.record_scrape();

    match state.collector.gather_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("编码指标失败: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}
