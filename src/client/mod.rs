//! Client layer over the store engine.
//!
//! `StoreClient` is the seam between a cache node and the durable store: the
//! node never touches sled directly. Production nodes use the HTTP client;
//! tests (and single-process deployments) use the in-process one.

mod http;
mod local;

pub use http::HttpStoreClient;
pub use local::LocalStoreClient;

use crate::errors::Result;

#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    /// Synchronous create against the store engine (the slow path).
    async fn shorten(&self, url: &str) -> Result<String>;

    /// Look up a key. Not-found and reserved-but-unresolved surface as their
    /// distinct error variants.
    async fn query(&self, key: &str) -> Result<String>;

    /// Reserve a batch of placeholder keys.
    async fn reserve(&self, num: usize) -> Result<Vec<String>>;

    /// Resolve a previously reserved key.
    async fn commit(&self, key: &str, url: &str) -> Result<()>;
}
