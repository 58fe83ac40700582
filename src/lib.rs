//! # Textedge - AI Text-Tool Edge Proxy
//!
//! Edge service for a set of AI text tools, providing:
//! - Request dispatch: route-path resolution, payload validation, CORS policy
//! - Upstream gateway: provider abstraction over Gemini / DeepSeek generation APIs
//! - Advisory rate limiting with a sliding 60-second window
//! - Offline cache routing: resource classification and cache-first /
//!   network-first strategies over versioned cache stores
//!
//! ## Architecture
//!
//! ```text
//!   browser ──► Request Dispatcher ──► Upstream AI Gateway ──► LLM API
//!                 │ CORS policy          │ provider trait
//!                 │ endpoint registry    │ status classification
//!                 │ rate limiter         │ single attempt, no retry
//!                 ▼
//!              JSON envelope (success / failure, CORS headers merged)
//!
//!   page fetches ──► Resource Classifier ──► Cache Router
//!                      static / api / navigation / pass-through
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod cors;
pub mod dispatch;
pub mod gateway;
pub mod registry;
pub mod swcache;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
