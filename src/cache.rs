//! Shared response cache
//!
//! Completed origin responses keyed by the literal `(method, uri)` pair the
//! client sent. There is no normalization, expiry or eviction: an entry lives
//! until the process exits or a newer response for the same key replaces it.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::http::response::Response;

/// Cache key: method token and request target, compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: String,
    pub uri: String,
}

impl CacheKey {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
        }
    }
}

/// Cloneable handle to one process-wide response store.
///
/// Every access goes through a single lock. Lookups hand out an owned copy,
/// so no handler can observe another's changes to a cached response.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<CacheKey, Response>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last response stored under `(method, uri)`.
    pub async fn get(&self, method: &str, uri: &str) -> Option<Response> {
        let key = CacheKey::new(method, uri);
        self.entries.read().await.get(&key).cloned()
    }

    /// Stores `response` under `(method, uri)`, replacing any previous entry.
    pub async fn set(&self, method: &str, uri: &str, response: Response) {
        let key = CacheKey::new(method, uri);
        let previous = self.entries.write().await.insert(key, response);

        if previous.is_some() {
            tracing::debug!(method, uri, "Replaced cached response");
        }
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
