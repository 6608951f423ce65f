mod ai;
mod config;
mod errors;
mod matching_client;
mod models;
mod platform;
mod routes;
mod session;
mod state;
mod ui;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::matching_client::HttpMatchingApi;
use crate::platform::backend::SimulatedBackend;
use crate::platform::facade::PlatformTimings;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobConnect web v{}", env!("CARGO_PKG_VERSION"));

    // Matching API client
    let matching_api = HttpMatchingApi::new(&config.matching_api_url, config.request_timeout)
        .context("Failed to build matching API client")?;
    info!(
        "Matching API client initialized (base: {}, timeout: {}s)",
        config.matching_api_url,
        config.request_timeout.as_secs()
    );

    let state = AppState {
        sessions: SessionStore::new(config.max_sessions),
        matching_api: Arc::new(matching_api),
        backend: Arc::new(SimulatedBackend::default()),
        timings: PlatformTimings::default(),
        config: config.clone(),
    };
    info!(
        "Session store ready (capacity {}, notification TTL {}ms)",
        config.max_sessions,
        config.notification_ttl.as_millis()
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the static frontend has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
