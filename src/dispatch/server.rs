//! HTTP edge server — router construction and serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::dispatch::handler::{self, AppState};
use crate::types::Result;

/// Build the dispatcher app. Every path funnels through the fallback handler
/// so route resolution stays in the endpoint registry and every branch gets
/// the same CORS treatment. Shared between production startup and tests.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new().fallback(handler::dispatch).with_state(state)
}

/// Edge dispatch server wrapping the shared app state.
#[derive(Debug)]
pub struct DispatchServer {
    state: Arc<AppState>,
    addr: SocketAddr,
    cancel: CancellationToken,
}

impl DispatchServer {
    pub fn new(state: Arc<AppState>, addr: SocketAddr) -> Self {
        Self {
            state,
            addr,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the server until cancelled or a fatal error occurs.
    pub async fn serve(&self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(
            "edge dispatcher listening on {} ({} tools registered, provider={})",
            self.addr,
            self.state.registry.len(),
            self.state.provider.name(),
        );

        let app = build_app(Arc::clone(&self.state));
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(self.cancel.clone().cancelled_owned())
        .await?;

        tracing::info!("edge dispatcher shut down");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
