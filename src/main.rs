use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use marketing_agent::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Arc::new(Config::load());

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| {
            format!(
                "Invalid AGENT_HTTP_BIND '{}' (expected host:port)",
                config.server.bind
            )
        })?;

    let router = marketing_agent::app(Arc::clone(&config))?;

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        mock_data = config.data.use_mock_data,
        auth = %config.server.bearer_token.as_deref().map(|_| "bearer").unwrap_or("none"),
        "Starting marketing agent HTTP server"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Server shutting down");
    Ok(())
}
