//! Tracing setup for the edge service.
//!
//! Output shape is part of the service configuration (`ObservabilityConfig`):
//! the configured level applies when `RUST_LOG` is unset, and `json_logs`
//! switches to one JSON object per line for log shippers.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::ObservabilityConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the process-wide tracing subscriber. Later calls are no-ops, so
/// test binaries and the server can both call it unconditionally.
pub fn init_tracing(config: &ObservabilityConfig) {
    if TRACING_INIT.set(()).is_err() {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_logs {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };

    // Another subscriber (e.g. a test harness) may already be installed;
    // the service keeps running either way.
    if let Err(err) = installed {
        eprintln!("tracing init skipped: {err}");
    }
}
