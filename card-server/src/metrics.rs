//! Prometheus metrics for card-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const HTTP_REQUESTS_TOTAL: &str = "card_http_requests_total";
const HTTP_REQUEST_DURATION: &str = "card_http_request_duration_seconds";
const RENDERS_TOTAL: &str = "card_renders_total";
const SECTIONS_OMITTED_TOTAL: &str = "card_sections_omitted_total";
const EXPORTS_TOTAL: &str = "card_exports_total";
const TEMPLATES_LOADED: &str = "card_templates_loaded";
const VALIDATION_FAILURES_TOTAL: &str = "card_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record an HTTP request.
///
/// # Arguments
///
/// * `method` - HTTP method (GET, POST, etc.)
/// * `path` - Matched route pattern
/// * `status` - HTTP status code
/// * `duration_secs` - Request duration in seconds
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

/// Record a rendered page.
///
/// # Arguments
///
/// * `category` - Template key
/// * `format` - "json" or "html"
/// * `omitted` - Number of sections that rendered nothing
pub fn record_render(category: &str, format: &str, omitted: usize) {
    counter!(
        RENDERS_TOTAL,
        "category" => category.to_string(),
        "format" => format.to_string()
    )
    .increment(1);
    if omitted > 0 {
        counter!(SECTIONS_OMITTED_TOTAL, "category" => category.to_string())
            .increment(omitted as u64);
    }
}

/// Record an export.
///
/// # Arguments
///
/// * `kind` - "vcard" or "share"
pub fn record_export(kind: &str) {
    counter!(EXPORTS_TOTAL, "kind" => kind.to_string()).increment(1);
}

/// Update the number of registered templates.
#[allow(clippy::cast_precision_loss)]
pub fn set_templates_loaded(count: usize) {
    gauge!(TEMPLATES_LOADED).set(count as f64);
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Type of validation that failed (category, page_url, name, etc.)
pub fn record_validation_failure(validation_type: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "type" => validation_type.to_string()
    )
    .increment(1);
}

/// Middleware recording request counts and latency per matched route.
pub async fn track_http(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_owned(), |p| p.as_str().to_owned());

    let response = next.run(request).await;

    record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
