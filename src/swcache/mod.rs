//! Offline cache routing — resource classification and caching strategies.
//!
//! Every intercepted fetch is classified (static asset / API / navigation /
//! pass-through) and served by the matching strategy:
//! - static assets: cache-first, populate on miss
//! - `/ai/*`: never cached; synthesized offline error on network failure
//! - `/health`, `/status`: network-first with a freshness window fallback
//! - navigation: network-first with a cached-page → offline-page chain
//! - everything else: straight through to the network
//!
//! Cache names are versioned strings so a deploy invalidates stale entries
//! without a manual purge.

mod classifier;
mod router;
mod store;

pub use classifier::{classify, ResourceClass};
pub use router::{CacheConfig, CacheRouter, Message, MessageReply};
pub use store::{CacheStorage, CachedEntry};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::types::{Error, Result};

/// One intercepted fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: String,
    pub url: Url,
    /// The request's Accept header, when known (navigation detection).
    pub accept: Option<String>,
}

impl FetchRequest {
    /// GET request for a URL.
    pub fn get(url: &str) -> Result<Self> {
        Ok(Self {
            method: "GET".to_string(),
            url: parse_url(url)?,
            accept: None,
        })
    }

    /// GET request for an HTML document load.
    pub fn navigation(url: &str) -> Result<Self> {
        Ok(Self {
            method: "GET".to_string(),
            url: parse_url(url)?,
            accept: Some("text/html,application/xhtml+xml".to_string()),
        })
    }

    /// Cache key: the full URL.
    pub fn cache_key(&self) -> String {
        self.url.to_string()
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::invalid_payload(format!("invalid URL '{url}': {e}")))
}

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    Synthesized,
}

/// Response produced by the cache router.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Live network access, abstracted so strategies are testable without a
/// network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

impl std::fmt::Debug for dyn Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fetcher")
    }
}

/// Production fetcher backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::invalid_payload(format!("invalid method {}", request.method)))?;

        let response = self
            .client
            .request(method, request.url.clone())
            .send()
            .await
            .map_err(|e| Error::connection_failure(format!("fetch failed: {e}")))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::connection_failure(format!("fetch body failed: {e}")))?;

        Ok(FetchResponse {
            status,
            content_type,
            body,
            source: ResponseSource::Network,
        })
    }
}
