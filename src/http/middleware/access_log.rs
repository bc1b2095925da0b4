//! Access logging middleware.
//!
//! Wraps the rest of the pipeline: request details are captured before
//! dispatch and one record is emitted after the response is produced, unless
//! the handler opted out via `RequestContext::suppress_access_log`.
//!
//! Bodies of unknown length are counted as they stream; their record is
//! written when the body finishes or the client goes away.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, Response},
    middleware::Next,
};

use futures_util::StreamExt;

use crate::http::request::RequestContext;
use crate::observability::{logging::ACCESS_LOG_TARGET, metrics};

/// One completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub latency_ms: u64,
    pub client_ip: String,
    /// Path with the query string appended when present.
    pub path: String,
    pub method: String,
    pub status: u16,
    pub body_size: u64,
    pub sequence: u64,
}

/// Destination for access records. Implementations must not block.
pub trait AccessLogSink: Send + Sync + 'static {
    fn record(&self, record: &AccessRecord);
}

/// Default sink: one `info` event under [`ACCESS_LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AccessLogSink for TracingSink {
    fn record(&self, record: &AccessRecord) {
        tracing::info!(
            target: ACCESS_LOG_TARGET,
            latency_ms = record.latency_ms,
            client_ip = %record.client_ip,
            path = %record.path,
            method = %record.method,
            status = record.status,
            body_size = record.body_size,
            sequence = record.sequence,
            "http request"
        );
    }
}

/// State for [`access_log_middleware`].
#[derive(Clone)]
pub struct AccessLogState {
    pub sink: Arc<dyn AccessLogSink>,
    pub enabled: bool,
}

pub async fn access_log_middleware(
    State(state): State<AccessLogState>,
    req: Request,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();

    let path = match req.uri().query() {
        Some(q) if !q.is_empty() => format!("{}?{}", req.uri().path(), q),
        _ => req.uri().path().to_string(),
    };
    let method = req.method().to_string();
    let client_ip = client_ip(
        req.headers(),
        req.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0),
    );
    let ctx = req.extensions().get::<RequestContext>().cloned();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    metrics::record_request(&method, status, start);

    if !state.enabled || ctx.as_ref().is_some_and(RequestContext::access_log_suppressed) {
        return response;
    }

    let sequence = ctx.as_ref().map(RequestContext::sequence).unwrap_or(0);
    let mut pending = PendingRecord {
        sink: state.sink,
        ctx,
        record: AccessRecord {
            latency_ms: start.elapsed().as_millis() as u64,
            client_ip,
            path,
            method,
            status,
            body_size: 0,
            sequence,
        },
    };

    match known_body_size(&response) {
        Some(size) => {
            pending.record.body_size = size;
            drop(pending);
            response
        }
        None => count_streamed_body(response, pending),
    }
}

/// A record written once the response body size is known.
struct PendingRecord {
    sink: Arc<dyn AccessLogSink>,
    ctx: Option<RequestContext>,
    record: AccessRecord,
}

impl Drop for PendingRecord {
    fn drop(&mut self) {
        if self.ctx.as_ref().is_some_and(RequestContext::access_log_suppressed) {
            return;
        }
        self.sink.record(&self.record);
    }
}

/// Wrap a body of unknown length so the bytes actually sent are counted.
/// The record is written when the body ends or is dropped.
fn count_streamed_body(response: Response<Body>, mut pending: PendingRecord) -> Response<Body> {
    let (parts, body) = response.into_parts();
    let counted = body.into_data_stream().map(move |chunk| {
        if let Ok(bytes) = &chunk {
            pending.record.body_size += bytes.len() as u64;
        }
        chunk
    });
    Response::from_parts(parts, Body::from_stream(counted))
}

/// Best-effort client address: forwarding headers first, then the peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn known_body_size<B: HttpBody>(response: &Response<B>) -> Option<u64> {
    response.body().size_hint().exact().or_else(|| {
        response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_precedence() {
        let peer: SocketAddr = "10.0.0.9:5555".parse().unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)), "10.0.0.9");
        assert_eq!(client_ip(&headers, None), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("192.168.1.2"));
        assert_eq!(client_ip(&headers, Some(peer)), "192.168.1.2");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_body_size_exact() {
        let response = Response::new(axum::body::Body::from("HELLO"));
        assert_eq!(known_body_size(&response), Some(5));

        let streamed = Response::new(Body::from_stream(futures_util::stream::iter(vec![
            Ok::<_, std::convert::Infallible>("abc"),
        ])));
        assert_eq!(known_body_size(&streamed), None);
    }
}
