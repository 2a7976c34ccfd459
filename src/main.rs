//! Fulltrack Alerts API — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the upstream client, identity cache,
//! and routes.
//!
//! See `README.md` for configuration and quickstart.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fulltrack_alerts::api::{self, AppState};
use fulltrack_alerts::config::AppConfig;
use fulltrack_alerts::fulltrack::FulltrackClient;
use fulltrack_alerts::identity::IdentityCache;
use fulltrack_alerts::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fulltrack_alerts=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Fails fast when the Fulltrack credentials are absent.
    let cfg = AppConfig::from_env()?;

    let metrics = Metrics::init();

    let telemetry = Arc::new(FulltrackClient::new(
        &cfg.base_url,
        &cfg.api_key,
        &cfg.secret_key,
    ));
    let cache = Arc::new(IdentityCache::new());
    let state = AppState::new(telemetry, cache);

    let app = api::create_router(state).merge(metrics.router());

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, version = api::SERVICE_VERSION, "fulltrack alerts api listening");

    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}
