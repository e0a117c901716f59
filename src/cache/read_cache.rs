//! Read-through cache for resolved keys.
//!
//! Two moka caches side by side: positive entries never expire (a resolved
//! key is immutable), negative entries carry a short TTL so a key resolved
//! elsewhere after a cached miss becomes visible once the TTL lapses.

use std::time::Duration;

use moka::future::Cache;
use tracing::trace;

/// Outcome of a local cache probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    /// Resolved url known locally.
    Found(String),
    /// A recent upstream miss is still within its TTL; do not re-query.
    NegativeHit,
    /// Nothing known locally, ask the store engine.
    Miss,
}

pub struct ReadCache {
    positive: Cache<String, String>,
    negative: Cache<String, ()>,
}

impl ReadCache {
    pub fn new(max_capacity: u64, negative_ttl_secs: u64) -> Self {
        let positive = Cache::builder().max_capacity(max_capacity).build();
        let negative = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(negative_ttl_secs))
            .build();

        trace!(
            max_capacity,
            negative_ttl_secs, "read cache initialized"
        );

        ReadCache { positive, negative }
    }

    pub async fn get(&self, key: &str) -> CacheResult {
        if let Some(url) = self.positive.get(key).await {
            trace!(key = %key, "positive cache hit");
            return CacheResult::Found(url);
        }
        if self.negative.get(key).await.is_some() {
            trace!(key = %key, "negative cache hit");
            return CacheResult::NegativeHit;
        }
        CacheResult::Miss
    }

    /// Record a resolution. Also clears any stale negative entry so the next
    /// read sees the url immediately.
    pub async fn insert_found(&self, key: &str, url: &str) {
        self.negative.invalidate(key).await;
        self.positive.insert(key.to_string(), url.to_string()).await;
    }

    /// Record an upstream miss for the negative TTL window.
    pub async fn mark_not_found(&self, key: &str) {
        trace!(key = %key, "caching negative result");
        self.negative.insert(key.to_string(), ()).await;
    }

    #[cfg(test)]
    async fn run_pending(&self) {
        self.positive.run_pending_tasks().await;
        self.negative.run_pending_tasks().await;
    }
}
