//! Prometheus metrics endpoint handler.
//!
//! Unauthenticated so Prometheus can scrape. Only operational data with
//! bounded cardinality labels is exposed, never token contents or
//! subjects.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for `GET /metrics`. Renders the Prometheus text format.
#[tracing::instrument(skip_all, name = "agency.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

#[cfg(test)]
mod tests {
    // A PrometheusHandle can only be created once per process, so the
    // endpoint is exercised by the integration tests, which share a
    // recorder across spawned servers.
}
