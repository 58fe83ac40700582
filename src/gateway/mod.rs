//! Upstream AI gateway — provider abstraction over external generation APIs.
//!
//! One dispatcher, parameterized by a provider selected at configuration
//! time, instead of per-backend code duplication. A provider makes exactly
//! one attempt per call; retry policy, if any, belongs to the caller.
//!
//! Failure classification (shared by all providers):
//! - upstream 400            → `BadRequest`
//! - upstream 401/403        → `AuthFailure`
//! - upstream 429            → `RateLimited`
//! - upstream >= 500         → `UpstreamUnavailable`
//! - other non-2xx           → `UnknownUpstream`
//! - transport error         → `ConnectionFailure`
//! - 2xx with blank fragment → `EmptyResponse`

mod deepseek;
mod gemini;

pub use deepseek::DeepSeekProvider;
pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{Error, ProviderKind, Result, UpstreamConfig};

/// Generation parameters forwarded to the upstream API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Upstream generation provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for logs and health output.
    fn name(&self) -> &'static str;

    /// Forward a composed prompt upstream and return the first generated
    /// text fragment. Single attempt; never retries.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Provider({})", self.name())
    }
}

/// Build the configured provider.
pub fn build_provider(config: &UpstreamConfig) -> Result<Arc<dyn Provider>> {
    match config.provider {
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::new(config)?)),
        ProviderKind::DeepSeek => Ok(Arc::new(DeepSeekProvider::new(config)?)),
    }
}

/// Map an upstream HTTP failure status to a caller-facing error kind.
pub(crate) fn classify_upstream_status(status: u16, detail: &str) -> Error {
    match status {
        400 => Error::BadRequest(format!("upstream returned 400: {detail}")),
        401 | 403 => Error::AuthFailure(format!("upstream returned {status}: check API key")),
        429 => Error::RateLimited(format!("upstream rate limit hit ({status})")),
        s if s >= 500 => Error::UpstreamUnavailable(format!("upstream returned {s}")),
        s => Error::UnknownUpstream(format!("upstream returned {s}: {detail}")),
    }
}

/// Shared reqwest client construction: JSON-only, per-request timeout.
pub(crate) fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))
}

/// Reject a blank generated fragment as a failure rather than success.
pub(crate) fn require_non_blank(fragment: Option<&str>, provider: &str) -> Result<String> {
    match fragment {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(Error::empty_response(format!(
            "{provider} returned no generated text"
        ))),
    }
}
