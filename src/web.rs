use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api;
use crate::config::ServerConfig;
use crate::SiteAnalyzer;

pub async fn run(server: &ServerConfig, analyzer: Arc<SiteAnalyzer>) -> Result<()> {
    let app = api::app(analyzer);

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server stopped unexpectedly")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
