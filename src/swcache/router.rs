//! Cache router — applies a caching strategy per resource class.

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::swcache::{
    classify, CacheStorage, CachedEntry, FetchRequest, FetchResponse, Fetcher, ResourceClass,
    ResponseSource,
};
use crate::types::Result;

/// Synthesized page returned when a navigation cannot be served from the
/// network or any cache.
const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Offline</title>
</head>
<body>
  <h1>You're Offline</h1>
  <p>Some features may not be available without internet.</p>
</body>
</html>
"#;

/// Cache router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Version string baked into cache names; bumping it on deploy
    /// invalidates stale entries without a manual purge.
    pub version: String,

    /// Site origin used to absolutize manifest paths.
    pub origin: String,

    /// Static paths pre-populated at install time.
    pub static_manifest: Vec<String>,

    /// Freshness window for cached health/status responses.
    #[serde(with = "humantime_serde")]
    pub freshness_window: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: "v1.0.0".to_string(),
            origin: "https://textedge.pages.dev".to_string(),
            static_manifest: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/css/style.css".to_string(),
                "/js/app.js".to_string(),
                "/manifest.json".to_string(),
                "/favicon.ico".to_string(),
                "/icons/icon-192x192.png".to_string(),
                "/icons/icon-512x512.png".to_string(),
                "/pages/about.html".to_string(),
                "/pages/contact.html".to_string(),
                "/pages/privacy.html".to_string(),
                "/pages/terms.html".to_string(),
            ],
            freshness_window: Duration::from_secs(5 * 60),
        }
    }
}

/// Control messages accepted by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Force activation of a waiting version (acknowledged; activation
    /// ordering belongs to the host).
    SkipWaiting,
    /// Delete all cache stores.
    ClearCache,
    /// Report the active cache version.
    GetVersion,
}

/// Replies to control messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageReply {
    Acknowledged,
    CacheCleared,
    Version(String),
}

/// Classifies intercepted fetches and applies the matching cache strategy.
#[derive(Debug)]
pub struct CacheRouter {
    config: CacheConfig,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<Mutex<CacheStorage>>,
}

impl CacheRouter {
    pub fn new(config: CacheConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_storage(config, fetcher, Arc::new(Mutex::new(CacheStorage::new())))
    }

    /// Router over shared storage (activation tests and version rollover).
    pub fn with_storage(
        config: CacheConfig,
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<Mutex<CacheStorage>>,
    ) -> Self {
        Self {
            config,
            fetcher,
            storage,
        }
    }

    fn static_cache_name(&self) -> String {
        format!("textedge-static-{}", self.config.version)
    }

    fn api_cache_name(&self) -> String {
        format!("textedge-api-{}", self.config.version)
    }

    /// Install phase: pre-populate the static cache from the manifest.
    /// Individual fetch failures are logged and skipped.
    pub async fn install(&self) {
        let cache_name = self.static_cache_name();
        for path in &self.config.static_manifest {
            let url = format!("{}{}", self.config.origin, path);
            let request = match FetchRequest::get(&url) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("install skipped {url}: {e}");
                    continue;
                }
            };
            match self.fetcher.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    self.store(&cache_name, &request.cache_key(), &response).await;
                }
                Ok(response) => {
                    tracing::warn!("install skipped {url}: status {}", response.status);
                }
                Err(e) => {
                    tracing::warn!("install skipped {url}: {e}");
                }
            }
        }
        tracing::info!(
            cache = %cache_name,
            entries = self.storage.lock().await.entries_in(&cache_name),
            "static cache installed"
        );
    }

    /// Activate phase: delete every cache not matching the current version
    /// names.
    pub async fn activate(&self) {
        let keep = [self.static_cache_name(), self.api_cache_name()];
        let mut storage = self.storage.lock().await;
        for name in storage.cache_names() {
            if !keep.contains(&name) {
                storage.delete_cache(&name);
                tracing::info!(cache = %name, "stale cache deleted");
            }
        }
    }

    /// Route one intercepted fetch through the matching strategy.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        match classify(request) {
            ResourceClass::StaticAsset => self.cache_first(request).await,
            ResourceClass::Api => self.api_request(request).await,
            ResourceClass::Navigation => self.navigation(request).await,
            ResourceClass::PassThrough => self.fetcher.fetch(request).await,
        }
    }

    /// Control channel: skip-waiting, clear-cache, get-version.
    pub async fn handle_message(&self, message: Message) -> MessageReply {
        match message {
            Message::SkipWaiting => MessageReply::Acknowledged,
            Message::ClearCache => {
                self.storage.lock().await.clear_all();
                MessageReply::CacheCleared
            }
            Message::GetVersion => MessageReply::Version(self.config.version.clone()),
        }
    }

    /// Total cached entries across all stores (diagnostics and tests).
    pub async fn cached_entries(&self) -> usize {
        self.storage.lock().await.total_entries()
    }

    // ── Strategies ───────────────────────────────────────────────────────

    /// Static assets: serve the cached copy if present; otherwise fetch,
    /// store a copy of a 2xx response, return the network response.
    async fn cache_first(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let cache_name = self.static_cache_name();
        let key = request.cache_key();

        if let Some(entry) = self.storage.lock().await.get(&cache_name, &key) {
            return Ok(cached_response(entry));
        }

        let response = self.fetcher.fetch(request).await?;
        if response.is_ok() {
            self.store(&cache_name, &key, &response).await;
        }
        Ok(response)
    }

    /// API paths: `/ai/*` is always live with a synthesized offline body on
    /// failure; health/status get a freshness-window fallback; other API
    /// paths pass through.
    async fn api_request(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let path = request.url.path().to_string();

        if path.starts_with("/ai/") {
            return match self.fetcher.fetch(request).await {
                Ok(response) => Ok(response),
                Err(e) => {
                    tracing::debug!("generation path offline: {e}");
                    Ok(offline_api_response())
                }
            };
        }

        if path.ends_with("/health") || path.ends_with("/status") || path == "/health" {
            return self.network_first_with_ttl(request).await;
        }

        self.fetcher.fetch(request).await
    }

    async fn network_first_with_ttl(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let cache_name = self.api_cache_name();
        let key = request.cache_key();

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(&cache_name, &key, &response).await;
                }
                Ok(response)
            }
            Err(e) => {
                let storage = self.storage.lock().await;
                match storage.get(&cache_name, &key) {
                    Some(entry) if entry.is_fresh(self.config.freshness_window, Utc::now()) => {
                        Ok(cached_response(entry))
                    }
                    _ => Err(e),
                }
            }
        }
    }

    /// Navigation: network-first; on failure fall back to the cached exact
    /// match, then the cached root document, then a synthesized offline page.
    async fn navigation(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let cache_name = self.static_cache_name();
        let key = request.cache_key();

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(&cache_name, &key, &response).await;
                }
                Ok(response)
            }
            Err(e) => {
                tracing::debug!("navigation offline: {e}");
                let storage = self.storage.lock().await;
                if let Some(entry) = storage.get(&cache_name, &key) {
                    return Ok(cached_response(entry));
                }
                let root_key = format!("{}/index.html", self.config.origin);
                if let Some(entry) = storage.get(&cache_name, &root_key) {
                    return Ok(cached_response(entry));
                }
                Ok(offline_page_response())
            }
        }
    }

    async fn store(&self, cache_name: &str, key: &str, response: &FetchResponse) {
        let entry = CachedEntry::new(
            response.status,
            response.content_type.clone(),
            response.body.clone(),
        );
        self.storage.lock().await.put(cache_name, key, entry);
    }
}

fn cached_response(entry: &CachedEntry) -> FetchResponse {
    FetchResponse {
        status: entry.status,
        content_type: entry.content_type.clone(),
        body: entry.body.clone(),
        source: ResponseSource::Cache,
    }
}

fn offline_api_response() -> FetchResponse {
    let body = serde_json::json!({
        "success": false,
        "error": "AI service unavailable. You are offline.",
        "offline": true,
    });
    FetchResponse {
        status: 503,
        content_type: "application/json".to_string(),
        body: Bytes::from(body.to_string()),
        source: ResponseSource::Synthesized,
    }
}

fn offline_page_response() -> FetchResponse {
    FetchResponse {
        status: 200,
        content_type: "text/html".to_string(),
        body: Bytes::from_static(OFFLINE_PAGE.as_bytes()),
        source: ResponseSource::Synthesized,
    }
}
