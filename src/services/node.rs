//! Cache node business logic: read-through resolution and pool-backed
//! creation, shared by the HTTP handlers and the integration tests.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::cache::{CacheResult, ReadCache, ReservePool};
use crate::client::StoreClient;
use crate::config::NodeConfig;
use crate::errors::{Result, ShortpoolError};
use crate::services::propagate::{PropagateTask, Propagator};
use crate::storage::codec;

pub struct NodeService {
    client: Arc<dyn StoreClient>,
    cache: ReadCache,
    pool: Arc<ReservePool>,
    propagator: Propagator,
    reserve_batch: usize,
}

impl NodeService {
    pub fn new(client: Arc<dyn StoreClient>, config: &NodeConfig) -> Self {
        let pool = Arc::new(ReservePool::new());
        let propagator = Propagator::spawn(
            client.clone(),
            pool.clone(),
            config.queue_depth,
            config.max_in_flight,
        );
        info!(
            reserve_batch = config.reserve_batch,
            cache_capacity = config.cache_capacity,
            negative_ttl_secs = config.negative_ttl_secs,
            "cache node initialized"
        );
        NodeService {
            client,
            cache: ReadCache::new(config.cache_capacity, config.negative_ttl_secs),
            pool,
            propagator,
            reserve_batch: config.reserve_batch,
        }
    }

    /// Resolve a key to its url, serving from the local cache when possible.
    ///
    /// A cached negative entry answers "not found" without an upstream call
    /// until its TTL lapses. Upstream not-found and reserved-pending both
    /// cache negatively; transport failures cache nothing.
    pub async fn resolve(&self, key: &str) -> Result<String> {
        match self.cache.get(key).await {
            CacheResult::Found(url) => Ok(url),
            CacheResult::NegativeHit => {
                Err(ShortpoolError::not_found(format!("no such key: {}", key)))
            }
            CacheResult::Miss => match self.client.query(key).await {
                Ok(url) => {
                    self.cache.insert_found(key, &url).await;
                    Ok(url)
                }
                Err(e) if e.is_not_found() => {
                    self.cache.mark_not_found(key).await;
                    Err(ShortpoolError::not_found(format!("no such key: {}", key)))
                }
                Err(e) => Err(e),
            },
        }
    }

    /// Create a short key for `url`.
    ///
    /// Fast path: pop a pre-reserved key, answer immediately, and let the
    /// propagation queue make the resolution durable. Slow path (pool empty
    /// or popped key expired): synchronous create against the store engine,
    /// with a refill queued so the next call can go fast again.
    pub async fn create_short(&self, url: &str) -> Result<String> {
        // never spend a reserved key on malformed input
        codec::validate_url(url)?;

        if let Ok(entry) = self.pool.pop() {
            if !entry.is_expired(Utc::now().timestamp()) {
                self.cache.insert_found(&entry.key, url).await;
                self.propagator.enqueue(PropagateTask::Commit {
                    key: entry.key.clone(),
                    url: url.to_string(),
                });
                debug!(key = %entry.key, "created via reservation pool");
                return Ok(entry.key);
            }
            // the store engine may already have reclaimed this key
            debug!(key = %entry.key, "discarding expired reserved key");
        }

        self.propagator.enqueue(PropagateTask::Refill {
            amount: self.reserve_batch,
        });

        let key = self.client.shorten(url).await?;
        self.cache.insert_found(&key, url).await;
        debug!(key = %key, "created via synchronous store call");
        Ok(key)
    }

    /// Pool handle, used by tests and the startup warm-up.
    pub fn pool(&self) -> &Arc<ReservePool> {
        &self.pool
    }

    /// Queue an initial pool refill; the outcome is observed through the pool.
    pub fn warm_up(&self) {
        self.propagator.enqueue(PropagateTask::Refill {
            amount: self.reserve_batch,
        });
    }
}
