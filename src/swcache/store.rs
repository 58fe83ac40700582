//! Versioned cache storage — named cache stores keyed by request URL.
//!
//! Append/overwrite-safe by construction: entries are immutable once stored
//! and a put simply replaces the previous entry for the key. Lifecycle
//! (TTL, version cleanup) belongs to the cache router, not the store.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// One cached response.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
    pub stored_at: DateTime<Utc>,
}

impl CachedEntry {
    pub fn new(status: u16, content_type: impl Into<String>, body: Bytes) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body,
            stored_at: Utc::now(),
        }
    }

    /// Whether the entry is still within the freshness window.
    pub fn is_fresh(&self, window: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        match chrono::Duration::from_std(window) {
            Ok(window) => age <= window,
            Err(_) => false,
        }
    }
}

/// Named cache stores, each a URL-keyed map of entries.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: HashMap<String, HashMap<String, CachedEntry>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry, overwriting any previous entry for the key.
    pub fn put(&mut self, cache_name: &str, key: impl Into<String>, entry: CachedEntry) {
        self.caches
            .entry(cache_name.to_string())
            .or_default()
            .insert(key.into(), entry);
    }

    pub fn get(&self, cache_name: &str, key: &str) -> Option<&CachedEntry> {
        self.caches.get(cache_name)?.get(key)
    }

    /// Names of all existing cache stores.
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.keys().cloned().collect();
        names.sort();
        names
    }

    /// Delete one cache store. Returns whether it existed.
    pub fn delete_cache(&mut self, cache_name: &str) -> bool {
        self.caches.remove(cache_name).is_some()
    }

    /// Delete every cache store. Idempotent.
    pub fn clear_all(&mut self) {
        self.caches.clear();
    }

    /// Total entries across all stores.
    pub fn total_entries(&self) -> usize {
        self.caches.values().map(HashMap::len).sum()
    }

    /// Entries in one store.
    pub fn entries_in(&self, cache_name: &str) -> usize {
        self.caches.get(cache_name).map_or(0, HashMap::len)
    }
}
