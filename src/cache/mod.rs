//! In-memory state owned by a single cache node: the read-through cache and
//! the reservation pool. Neither is shared across nodes or persisted; both
//! are rebuilt empty on restart.

pub mod pool;
pub mod read_cache;

pub use pool::{ReservePool, ReservedKey};
pub use read_cache::{CacheResult, ReadCache};
