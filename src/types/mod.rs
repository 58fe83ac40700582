//! Core types for the textedge service.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Application error taxonomy with thiserror derives and
//!   HTTP status mapping
//! - **Config**: Configuration structures with fail-fast environment loading

mod config;
mod errors;

pub use config::{
    Config, CorsConfig, ObservabilityConfig, ProviderKind, RateLimitConfig, ServerConfig,
    UpstreamConfig,
};
pub use errors::{Error, Result};
