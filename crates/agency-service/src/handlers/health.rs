//! Health check handlers for liveness and readiness probes.

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Returns "OK" if the process is running. Checks no dependencies;
/// failure means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Verifies the JWKS endpoint is configured. Keys are fetched on demand
/// during verification, so only the configuration is checked here; an
/// unreachable provider fails individual requests, not readiness.
///
/// Error text is generic so infrastructure details don't leak; the real
/// reason is logged server-side.
#[tracing::instrument(skip_all, name = "agency.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.config.jwks_url.is_empty() {
        tracing::warn!(target: "agency.health", "readiness check failed: JWKS URL not configured");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                jwks: Some("unconfigured"),
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            jwks: Some("configured"),
            error: None,
        }),
    )
}
