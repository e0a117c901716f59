//! Shortpool - a horizontally scalable URL shortener
//!
//! Two tiers share this library:
//! - the **store engine** (`shortpool-store`): a sled-backed transactional
//!   key -> url table that guarantees globally unique base-62 keys under
//!   concurrent writers and leases out batches of pre-reserved keys;
//! - the **cache node** (`shortpool-node`): a front-line server that answers
//!   creates from a local pool of reserved keys and reads from a local cache
//!   with negative-result caching, propagating writes back to the store
//!   engine asynchronously.
//!
//! # Architecture
//! - `storage`: durable store engine (key codec, record model, transactions)
//! - `cache`: node-local read cache and reservation pool
//! - `client`: store-engine client seam (HTTP and in-process)
//! - `services`: node business logic and the write-behind queue
//! - `api`: actix-web handlers and wire DTOs for both tiers
//! - `config`: configuration management
//! - `system`: logging and platform glue

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
