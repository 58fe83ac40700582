//! Configuration structures.
//!
//! Configuration is loaded from environment variables in a single explicit
//! step at startup (`Config::from_env`). Required values that are absent fail
//! fast there, rather than being probed from multiple sources at request time.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{Error, Result};

/// Global service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// CORS origin policy.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Upstream generation API configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Advisory rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing level used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit one JSON object per log line instead of compact text.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP bind address for the edge dispatcher.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8787".to_string(),
        }
    }
}

/// CORS origin policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Exact origins allowed to have their origin echoed back.
    pub allowed_origins: Vec<String>,

    /// Trusted production domain; origins containing it are also echoed.
    pub trusted_suffix: String,

    /// Canonical origin returned when the caller's origin is not allowed.
    /// Never a wildcard and never a reflection of the caller.
    pub default_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://textedge.pages.dev".to_string(),
                "http://localhost:5000".to_string(),
                "http://127.0.0.1:5000".to_string(),
            ],
            trusted_suffix: "textedge.pages.dev".to_string(),
            default_origin: "https://textedge.pages.dev".to_string(),
        }
    }
}

/// Which upstream generation API to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    DeepSeek,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "deepseek" => Ok(Self::DeepSeek),
            other => Err(Error::configuration(format!(
                "unknown provider '{other}' (expected 'gemini' or 'deepseek')"
            ))),
        }
    }
}

/// Upstream generation API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Provider selected at configuration time.
    pub provider: ProviderKind,

    /// API credential. Required; never logged beyond a boolean presence.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Override for the provider's endpoint URL (used by tests and
    /// self-hosted gateways). `None` uses the provider default.
    pub base_url: Option<String>,

    /// Per-request upstream timeout. The original edge handler imposed none;
    /// a disconnect left the upstream call running to its own limits.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            api_key: String::new(),
            base_url: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Advisory rate limiting configuration.
///
/// In-memory sliding window, resets on restart. Throttling aid only, not a
/// security control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per caller within the window.
    pub max_requests: u32,

    /// Sliding window length.
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Load configuration from the environment, failing fast when required
    /// values are absent.
    ///
    /// Recognized variables:
    /// - `TEXTEDGE_API_KEY` (required, non-empty)
    /// - `TEXTEDGE_PROVIDER` (`gemini` | `deepseek`)
    /// - `TEXTEDGE_LISTEN_ADDR`
    /// - `TEXTEDGE_UPSTREAM_URL`
    /// - `TEXTEDGE_ALLOWED_ORIGINS` (comma-separated)
    /// - `TEXTEDGE_DEFAULT_ORIGIN`
    /// - `TEXTEDGE_LOG_LEVEL`
    /// - `TEXTEDGE_LOG_FORMAT` (`json` for JSON log lines)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup. Parsing lives here so it
    /// is testable without mutating process-wide environment state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        let api_key = lookup("TEXTEDGE_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(Error::configuration(
                "TEXTEDGE_API_KEY is not set; refusing to start without an upstream credential",
            ));
        }
        config.upstream.api_key = api_key;

        if let Some(provider) = lookup("TEXTEDGE_PROVIDER") {
            config.upstream.provider = ProviderKind::parse(&provider)?;
        }
        if let Some(addr) = lookup("TEXTEDGE_LISTEN_ADDR") {
            config.server.listen_addr = addr;
        }
        if let Some(url) = lookup("TEXTEDGE_UPSTREAM_URL") {
            config.upstream.base_url = Some(url);
        }
        if let Some(origins) = lookup("TEXTEDGE_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(origin) = lookup("TEXTEDGE_DEFAULT_ORIGIN") {
            config.cors.default_origin = origin;
        }
        if let Some(level) = lookup("TEXTEDGE_LOG_LEVEL") {
            config.observability.log_level = level;
        }
        if let Some(format) = lookup("TEXTEDGE_LOG_FORMAT") {
            config.observability.json_logs = format.eq_ignore_ascii_case("json");
        }

        Ok(config)
    }
}
