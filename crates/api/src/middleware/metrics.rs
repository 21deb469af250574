//! Prometheus metrics middleware and exporter.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

use crate::app::AppState;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Records `http_requests_total` (method, path, status) and
/// `http_request_duration_seconds` (method, path).
///
/// The path label is the matched route template, so `/inventory/:id` is one
/// series regardless of the id.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}

fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Counts a login attempt by outcome (`success` or `failure`).
pub fn record_login_attempt(outcome: &'static str) {
    counter!("auth_login_attempts_total", "outcome" => outcome).increment(1);
}

/// Counts an item write (`create`, `update` or `delete`).
pub fn record_item_mutation(operation: &'static str) {
    counter!("inventory_item_mutations_total", "operation" => operation).increment(1);
}

/// Counts a stock movement by type and adds its size.
pub fn record_stock_movement(transaction_type: &'static str, quantity: i32) {
    counter!("inventory_stock_transactions_total", "type" => transaction_type).increment(1);
    counter!("inventory_stock_units_total", "type" => transaction_type)
        .increment(quantity.max(0) as u64);
}

/// Counts activity entries that could not be written.
pub fn record_activity_failure() {
    counter!("activity_log_failures_total").increment(1);
}

/// `GET /metrics` in Prometheus text format. Pool gauges are refreshed per scrape.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    persistence::metrics::record_pool_metrics(&state.pool);

    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized",
        )
            .into_response(),
    }
}

/// Installs the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> Result<(), BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_to_str() {
        assert_eq!(method_to_str(&Method::GET), "GET");
        assert_eq!(method_to_str(&Method::POST), "POST");
        assert_eq!(method_to_str(&Method::PUT), "PUT");
        assert_eq!(method_to_str(&Method::DELETE), "DELETE");
        assert_eq!(method_to_str(&Method::TRACE), "OTHER");
    }

    #[test]
    fn test_business_counters_without_recorder() {
        record_login_attempt("success");
        record_item_mutation("create");
        record_stock_movement("add", 5);
        record_stock_movement("remove", -1);
        record_activity_failure();
    }
}
