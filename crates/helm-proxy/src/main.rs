//! helm-proxy binary: serves the chat proxy.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use helm_proxy::ProxyServer;
use tracing_subscriber::EnvFilter;

/// Chat proxy for the helm console.
#[derive(Parser, Debug)]
#[command(name = "helm-proxy", about = "Chat proxy for the helm console")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings; 0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Upstream agent API URL (overrides settings).
    #[arg(long)]
    agent_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Cli::parse();
    let settings = helm_settings::get_settings();

    let mut agent = settings.agent.clone();
    if let Some(url) = args.agent_url {
        agent.api_url = url;
    }
    let host = args.host.unwrap_or_else(|| settings.proxy.host.clone());
    let port = args.port.unwrap_or(settings.proxy.port);

    let agent_url = agent.api_url.clone();
    let server = ProxyServer::new(agent);
    let router = server.router();

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;
    let addr = listener.local_addr().context("no local address")?;
    tracing::info!(%addr, agent = %agent_url, "helm-proxy listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("helm-proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
