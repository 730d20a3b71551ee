//! Spawnable test server wired to a mocked JWKS endpoint.

use crate::keys::{TestClaims, TestKeypair};
use agency_service::config::Config;
use agency_service::observability::metrics::init_metrics_recorder;
use agency_service::routes::{build_routes, AppState};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Audience the harness configures and mints tokens for.
pub const TEST_AUDIENCE: &str = "casting-agency";

/// Issuer the harness configures and mints tokens for.
pub const TEST_ISSUER: &str = "https://agency-test.auth0.com/";

const JWKS_PATH: &str = "/.well-known/jwks.json";

/// The Prometheus recorder can be installed once per process; every
/// spawned server in a test binary shares this handle.
fn test_metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// A running service instance backed by a wiremock JWKS endpoint.
///
/// JWKS caching is disabled (TTL 0) so tests that swap the published
/// keys take effect on the next request.
pub struct TestAgencyServer {
    addr: SocketAddr,
    mock_jwks: MockServer,
    keypair: TestKeypair,
    server_handle: tokio::task::JoinHandle<()>,
}

impl TestAgencyServer {
    /// Starts the mock JWKS endpoint (publishing the primary keypair)
    /// and the service on an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, routing, or binding fails.
    pub async fn spawn() -> anyhow::Result<Self> {
        let keypair = TestKeypair::primary();

        let mock_jwks = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(keypair.jwks_json()))
            .mount(&mock_jwks)
            .await;

        let mut vars = HashMap::new();
        vars.insert(
            "AUTH_DOMAIN".to_string(),
            "agency-test.auth0.com".to_string(),
        );
        vars.insert("AUTH_AUDIENCE".to_string(), TEST_AUDIENCE.to_string());
        vars.insert("AUTH_ISSUER".to_string(), TEST_ISSUER.to_string());
        vars.insert(
            "AUTH_JWKS_URL".to_string(),
            format!("{}{JWKS_PATH}", mock_jwks.uri()),
        );
        vars.insert("JWKS_CACHE_TTL_SECONDS".to_string(), "0".to_string());
        let config = Config::from_vars(&vars)?;

        let state = Arc::new(AppState::new(config));
        let app = build_routes(state, test_metrics_handle())?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server_handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            mock_jwks,
            keypair,
            server_handle,
        })
    }

    /// Full URL for a path on the spawned server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The keypair whose JWK the mock publishes by default.
    pub fn keypair(&self) -> &TestKeypair {
        &self.keypair
    }

    /// Claims matching the harness audience and issuer.
    pub fn valid_claims(&self) -> TestClaims {
        TestClaims::new(TEST_AUDIENCE, TEST_ISSUER, "auth0|test-user")
    }

    /// A signed token with the given permissions.
    pub fn token_with_permissions(&self, permissions: &[&str]) -> String {
        self.keypair
            .sign_token(&self.valid_claims().with_permissions(permissions))
    }

    /// Replaces the published JWKS with `keypair`'s. Tokens signed by
    /// the old key then fail with an unknown `kid`.
    pub async fn publish_jwks_for(&self, keypair: &TestKeypair) {
        self.mock_jwks.reset().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(keypair.jwks_json()))
            .mount(&self.mock_jwks)
            .await;
    }

    /// Publishes a JWKS whose `kid` matches the primary keypair but
    /// whose modulus belongs to `other`, so signatures stop verifying.
    pub async fn publish_mismatched_key(&self, other: &TestKeypair) {
        self.mock_jwks.reset().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(self.keypair.jwks_json_with_modulus_of(other)),
            )
            .mount(&self.mock_jwks)
            .await;
    }

    /// Makes the JWKS endpoint return 500 for every fetch.
    pub async fn break_jwks_endpoint(&self) {
        self.mock_jwks.reset().await;
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.mock_jwks)
            .await;
    }
}

impl Drop for TestAgencyServer {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}
