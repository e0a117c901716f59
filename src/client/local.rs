//! In-process store client: same contract as the HTTP client, but straight
//! onto a shared `UrlStore`. sled calls are blocking, so they run on the
//! blocking pool.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::StoreClient;
use crate::errors::{Result, ShortpoolError};
use crate::storage::UrlStore;

pub struct LocalStoreClient {
    store: Arc<UrlStore>,
}

impl LocalStoreClient {
    pub fn new(store: Arc<UrlStore>) -> Self {
        LocalStoreClient { store }
    }
}

async fn run_blocking<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| ShortpoolError::unavailable(format!("blocking task failed: {}", e)))?
}

#[async_trait]
impl StoreClient for LocalStoreClient {
    async fn shorten(&self, url: &str) -> Result<String> {
        let store = self.store.clone();
        let url = url.to_string();
        run_blocking(move || store.store(&url)).await
    }

    async fn query(&self, key: &str) -> Result<String> {
        let store = self.store.clone();
        let key = key.to_string();
        run_blocking(move || store.query(&key)).await
    }

    async fn reserve(&self, num: usize) -> Result<Vec<String>> {
        let store = self.store.clone();
        run_blocking(move || store.reserve(num)).await
    }

    async fn commit(&self, key: &str, url: &str) -> Result<()> {
        let store = self.store.clone();
        let key = key.to_string();
        let url = url.to_string();
        run_blocking(move || store.commit(&key, &url)).await
    }
}
