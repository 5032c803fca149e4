//! # discover-server
//!
//! The entry point that assembles the discovery service from configuration
//! and compile-time features.

mod telemetry;
mod wiring;

use anyhow::Context;
use configs::Settings;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    telemetry::init(&settings.logging)?;

    let wired = wiring::build(&settings).await?;
    let app = api_adapters::router(wired.state);

    let listener = tokio::net::TcpListener::bind(settings.server.bind_address())
        .await
        .with_context(|| format!("binding {}", settings.server.bind_address()))?;
    tracing::info!(address = %listener.local_addr()?, "discover-server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    wired.sweeper.abort();
    tracing::info!("discover-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
