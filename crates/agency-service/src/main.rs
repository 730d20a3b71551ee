//! Service entry point.

use agency_service::config::Config;
use agency_service::observability::metrics::init_metrics_recorder;
use agency_service::routes::{build_routes, AppState};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agency_service=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(
        target: "agency.main",
        auth_domain = %config.auth_domain,
        audience = %config.audience,
        "configuration loaded"
    );

    let metrics_handle =
        init_metrics_recorder().map_err(|e| anyhow::anyhow!("metrics init failed: {e}"))?;

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config));
    let app = build_routes(state, metrics_handle).context("failed to build routes")?;

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!(target: "agency.main", addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!(target: "agency.main", "shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(target: "agency.main", error = %e, "failed to install SIGINT handler");
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(target: "agency.main", error = %e, "failed to install SIGTERM handler");
            }
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!(target: "agency.main", "received SIGINT"),
        () = terminate => tracing::info!(target: "agency.main", "received SIGTERM"),
    }
}
