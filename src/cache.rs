//! In-memory cache of generated logbooks.
//!
//! Logbook generation is deterministic for a given request, so responses are
//! cached by the request's input hash.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;

use crate::logbook::LogbookResponse;

/// Cache statistics reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Clone)]
pub struct AppCache {
    logbooks: Cache<String, Arc<LogbookResponse>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl AppCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            logbooks: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get_logbook(&self, input_hash: &str) -> Option<Arc<LogbookResponse>> {
        let cached = self.logbooks.get(input_hash).await;
        let counter = if cached.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        cached
    }

    pub async fn insert_logbook(&self, response: Arc<LogbookResponse>) {
        self.logbooks.insert(response.input_hash.clone(), response).await;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.logbooks.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
