//! Request id middleware.
//!
//! Every request runs inside a span carrying its request id, which is
//! echoed back in the `X-Request-ID` response header.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Longest client-supplied id that is accepted as is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Uses the caller's `X-Request-ID` when it is usable, otherwise a new UUID v4.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| is_acceptable_id(s))
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
        user_id = tracing::field::Empty,
    );

    let start = std::time::Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    span.in_scope(|| {
        tracing::info!(status = status, duration_ms = duration_ms, "Request completed");
    });

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), header_value);
    }

    response
}

fn is_acceptable_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
