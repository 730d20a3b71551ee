//! Metrics definitions.
//!
//! Naming follows Prometheus conventions: `agency_` prefix, `_total`
//! suffix for counters, `_seconds` suffix for duration histograms.
//!
//! # Cardinality
//!
//! Labels are bounded: `method` is the HTTP verb set, `endpoint` is the
//! normalized route set (dynamic segments replaced with placeholders,
//! unknown paths collapsed to `/other`), `code` is the fixed error-code
//! set from `AgencyError::error_code`.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded; a process can only
/// install one recorder.
///
/// # Errors
///
/// Returns an error if the recorder fails to install (e.g., already
/// installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("agency_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `agency_http_requests_total`,
/// `agency_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
///
/// Captures ALL HTTP responses including framework-level errors (404,
/// 405, JSON parse 400s) because the middleware sits outermost.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("agency_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("agency_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout.
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/ready" | "/metrics" | "/api/v1/me" | "/api/v1/actors"
        | "/api/v1/movies" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

/// Replace the trailing id segment of resource paths with a
/// placeholder. Unknown paths collapse to `/other`.
fn normalize_dynamic_endpoint(path: &str) -> String {
    for (prefix, normalized) in [
        ("/api/v1/actors/", "/api/v1/actors/{id}"),
        ("/api/v1/movies/", "/api/v1/movies/{id}"),
    ] {
        if let Some(rest) = path.strip_prefix(prefix) {
            if !rest.is_empty() && !rest.contains('/') {
                return normalized.to_string();
            }
        }
    }
    "/other".to_string()
}

// ============================================================================
// Authorization Metrics
// ============================================================================

/// Record a request that passed the authorization middleware.
///
/// Metric: `agency_auth_success_total`
pub fn record_auth_success() {
    counter!("agency_auth_success_total").increment(1);
}

/// Record a request rejected by the authorization middleware.
///
/// Metric: `agency_auth_failures_total`
/// Labels: `code` (bounded by the error taxonomy)
pub fn record_auth_failure(code: &str) {
    counter!("agency_auth_failures_total",
        "code" => code.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests exercise the recording functions against the global
    // no-op recorder; values are not inspected. The functions must not
    // panic with no recorder installed.

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, Duration::from_millis(5));
        record_http_request("GET", "/api/v1/actors", 200, Duration::from_millis(50));
        record_http_request("PATCH", "/api/v1/actors/7", 404, Duration::from_millis(3));
        record_http_request("GET", "/api/v1/me", 401, Duration::from_millis(10));
        record_http_request("GET", "/api/v1/movies", 504, Duration::from_secs(30));
    }

    #[test]
    fn test_record_auth_outcomes() {
        record_auth_success();
        record_auth_failure("token_expired");
        record_auth_failure("unauthorized");
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(204), "success");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(401), "error");
        assert_eq!(categorize_status_code(403), "error");
        assert_eq!(categorize_status_code(500), "error");
    }

    #[test]
    fn test_normalize_endpoint_known_paths() {
        assert_eq!(normalize_endpoint("/health"), "/health");
        assert_eq!(normalize_endpoint("/ready"), "/ready");
        assert_eq!(normalize_endpoint("/metrics"), "/metrics");
        assert_eq!(normalize_endpoint("/api/v1/me"), "/api/v1/me");
        assert_eq!(normalize_endpoint("/api/v1/actors"), "/api/v1/actors");
        assert_eq!(normalize_endpoint("/api/v1/movies"), "/api/v1/movies");
    }

    #[test]
    fn test_normalize_endpoint_id_paths() {
        assert_eq!(
            normalize_endpoint("/api/v1/actors/42"),
            "/api/v1/actors/{id}"
        );
        assert_eq!(
            normalize_endpoint("/api/v1/movies/1234"),
            "/api/v1/movies/{id}"
        );
    }

    #[test]
    fn test_normalize_endpoint_unknown_paths() {
        assert_eq!(normalize_endpoint("/unknown"), "/other");
        assert_eq!(normalize_endpoint("/api/v2/actors"), "/other");
        assert_eq!(normalize_endpoint("/api/v1/actors/42/extra"), "/other");
        assert_eq!(normalize_endpoint("/api/v1/actors/"), "/other");
    }
}
