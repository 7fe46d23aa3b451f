//! CTI Dashboard HTTP service
//!
//! Thin shell that wires configuration, providers and the scan log into an
//! axum router. Business logic lives in the `crates/` directory.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

use anyhow::Context;
use cti_core::AppConfig;
use tracing::info;

/// Name reported by `/` and `/health`.
pub const SERVICE_NAME: &str = "cti-dashboard";

/// Crate version reported by `/` and `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cti_server=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Serve the API until Ctrl-C.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting {} v{}", SERVICE_NAME, VERSION);

    let state = AppState::from_config(&config).await?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
