//! HTTP 中间件
//!
//! 提供请求追踪和指标收集的中间件。

use std::time::{Duration, Instant};

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, info_span, warn};

use super::metrics;

/// 超过此耗时的请求额外记录一条 warn 日志
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(1000);

/// HTTP 请求追踪和指标中间件
///
/// 为每个请求创建追踪 span 并记录指标。指标路径经过归一化，
/// 通知 id 等路径参数不会撑爆标签基数。
pub async fn http_tracing(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();

    let span = info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as i64);

    if latency > SLOW_REQUEST_THRESHOLD {
        warn!(
            method = %method,
            path = %path,
            latency_ms = latency.as_millis() as i64,
            "慢请求"
        );
    }

    metrics::record_http_request(&method, &normalize_path(&path), status, latency.as_secs_f64());

    response
}

/// 将路径中的 UUID 段替换为占位符，控制指标标签基数
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if uuid::Uuid::parse_str(segment).is_ok() {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// 请求 ID 中间件
///
/// 为每个请求添加唯一 ID，便于日志关联。调用方可通过
/// x-request-id 头传入自己的 ID 做端到端追踪。
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// 请求 ID 包装类型
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_replaces_uuid_segments() {
        let path = "/api/notifications/0198c0de-0000-7000-8000-0123456789ab/read";
        assert_eq!(normalize_path(path), "/api/notifications/{id}/read");
    }

    #[test]
    fn test_normalize_path_keeps_static_segments() {
        assert_eq!(
            normalize_path("/api/notifications/unread-count"),
            "/api/notifications/unread-count"
        );
    }
}
