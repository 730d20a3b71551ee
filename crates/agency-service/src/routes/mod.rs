//! Router composition and shared state.
//!
//! Three router groups are merged into the final app:
//!
//! - public: `/health`, `/ready` (no auth)
//! - metrics: `/metrics` (no auth, Prometheus scrape)
//! - protected: `/api/v1/*`, each route wrapped with the authorization
//!   middleware carrying that route's required permission
//!
//! The same path can appear in several protected routers (e.g. GET and
//! POST `/api/v1/actors` demand different permissions); merging combines
//! their method routers while each keeps its own middleware.

use crate::auth::jwks::JwksClient;
use crate::auth::verify::TokenVerifier;
use crate::config::Config;
use crate::errors::AgencyError;
use crate::handlers;
use crate::middleware::auth::{require_auth, require_permission, AuthState, PermissionState};
use crate::middleware::http_metrics::http_metrics_middleware;
use crate::models::Catalog;
use axum::routing::{delete, get, patch, post, MethodRouter};
use axum::{middleware, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog: RwLock<Catalog>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            catalog: RwLock::new(Catalog::default()),
        }
    }
}

/// Builds the complete application router.
///
/// # Errors
///
/// Returns [`AgencyError`] if the JWKS HTTP client cannot be built.
pub fn build_routes(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
) -> Result<Router, AgencyError> {
    let jwks_client = Arc::new(JwksClient::new(
        state.config.jwks_url.clone(),
        state.config.jwks_cache_ttl,
    )?);
    let verifier = Arc::new(TokenVerifier::new(
        jwks_client,
        state.config.audience.clone(),
        state.config.issuer.clone(),
        state.config.algorithms.clone(),
        state.config.leeway,
    ));

    let auth_state = AuthState {
        verifier: Arc::clone(&verifier),
    };
    let require = |permission: &'static str| PermissionState {
        verifier: Arc::clone(&verifier),
        permission,
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(Arc::clone(&state));

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .with_state(metrics_handle);

    let me_routes = Router::new()
        .route("/api/v1/me", get(handlers::me::get_me))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    let app = public_routes
        .merge(metrics_routes)
        .merge(me_routes)
        .merge(guarded(
            &state,
            "/api/v1/actors",
            get(handlers::actors::list_actors),
            require("view:actors"),
        ))
        .merge(guarded(
            &state,
            "/api/v1/actors",
            post(handlers::actors::create_actor),
            require("add:actors"),
        ))
        .merge(guarded(
            &state,
            "/api/v1/actors/:id",
            patch(handlers::actors::update_actor),
            require("edit:actors"),
        ))
        .merge(guarded(
            &state,
            "/api/v1/actors/:id",
            delete(handlers::actors::delete_actor),
            require("delete:actors"),
        ))
        .merge(guarded(
            &state,
            "/api/v1/movies",
            get(handlers::movies::list_movies),
            require("view:movies"),
        ))
        .merge(guarded(
            &state,
            "/api/v1/movies",
            post(handlers::movies::create_movie),
            require("add:movies"),
        ))
        .merge(guarded(
            &state,
            "/api/v1/movies/:id",
            patch(handlers::movies::update_movie),
            require("edit:movies"),
        ))
        .merge(guarded(
            &state,
            "/api/v1/movies/:id",
            delete(handlers::movies::delete_movie),
            require("delete:movies"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        // Outermost so it observes every response, including
        // framework-level errors.
        .layer(middleware::from_fn(http_metrics_middleware));

    Ok(app)
}

/// A single route wrapped with the permission middleware for exactly
/// that route.
fn guarded(
    state: &Arc<AppState>,
    path: &str,
    method_router: MethodRouter<Arc<AppState>>,
    permission_state: PermissionState,
) -> Router {
    Router::new()
        .route(path, method_router)
        .route_layer(middleware::from_fn_with_state(
            permission_state,
            require_permission,
        ))
        .with_state(Arc::clone(state))
}
