//! Trace ID 中间件
//! 为每个请求生成唯一的 trace_id，用于全链路追踪

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// 请求扩展中保存的 trace_id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

/// Trace ID 生成器
pub struct TraceIdGenerator;

impl TraceIdGenerator {
    /// 生成新的 trace_id
    pub fn generate() -> String {
        Uuid::new_v4().to_string()
    }

    /// 从请求头中提取 trace_id，如果没有则生成新的
    pub fn get_or_generate(req: &Request) -> String {
        req.headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= 128)
            .map(str::to_string)
            .unwrap_or_else(Self::generate)
    }
}

/// 为每个请求生成或提取 trace_id，写入请求扩展和响应头
pub async fn trace_id_middleware(mut req: Request, next: Next) -> Response {
    let trace_id = TraceIdGenerator::get_or_generate(&req);

    req.extensions_mut().insert(TraceId(trace_id.clone()));

    let span = tracing::info_span!(
        "request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path()
    );
    tracing::debug!(parent: &span, "Request received");
    let mut response = next.run(req).instrument(span).await;

    if let Ok(header_value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, header_value);
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_reuses_incoming_trace_id() {
        let req = Request::builder()
            .header(TRACE_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(TraceIdGenerator::get_or_generate(&req), "abc-123");
    }

    #[test]
    fn test_generates_when_missing() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = TraceIdGenerator::get_or_generate(&req);
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
