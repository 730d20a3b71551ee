//! Request middleware: authorization and HTTP metrics.

pub mod auth;
pub mod http_metrics;

pub use auth::{require_auth, require_permission, AuthState, PermissionState};
pub use http_metrics::http_metrics_middleware;
