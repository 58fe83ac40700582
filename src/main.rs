//! Textedge server - main entry point.
//!
//! Loads configuration from the environment (failing fast on a missing
//! upstream credential), builds the configured provider, and serves the edge
//! dispatcher until SIGINT/SIGTERM.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use textedge::dispatch::{AppState, DispatchServer};
use textedge::gateway::build_provider;
use textedge::registry::EndpointRegistry;
use textedge::types::ProviderKind;
use textedge::Config;

#[derive(Debug, Parser)]
#[command(name = "textedge-server", version, about = "AI text-tool edge proxy")]
struct Args {
    /// Bind address (host:port). Overrides TEXTEDGE_LISTEN_ADDR.
    #[arg(long)]
    listen_addr: Option<String>,

    /// Upstream provider (gemini | deepseek). Overrides TEXTEDGE_PROVIDER.
    #[arg(long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Single explicit configuration step; missing credential fails here,
    // never at request time.
    let mut config = Config::from_env()?;
    textedge::observability::init_tracing(&config.observability);
    if let Some(addr) = args.listen_addr {
        config.server.listen_addr = addr;
    }
    if let Some(provider) = args.provider {
        config.upstream.provider = ProviderKind::parse(&provider)?;
    }

    let addr: SocketAddr = config.server.listen_addr.parse()?;
    let provider = build_provider(&config.upstream)?;
    let registry = EndpointRegistry::builtin();

    tracing::info!(
        provider = provider.name(),
        tools = registry.len(),
        has_api_key = !config.upstream.api_key.is_empty(),
        "textedge starting"
    );

    let state = Arc::new(AppState::new(config, registry, provider));
    let server = Arc::new(DispatchServer::new(state, addr));

    // Graceful shutdown on Ctrl-C.
    let shutdown_handle = Arc::clone(&server);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            shutdown_handle.shutdown();
        }
    });

    server.serve().await?;
    Ok(())
}
