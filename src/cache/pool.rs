//! Reservation pool: a node-local LIFO of pre-reserved keys.
//!
//! Popping the most recent batch first is irrelevant for correctness; it only
//! skews which key lengths get spent first. What matters is that push and pop
//! are atomic under concurrent request handlers.

use parking_lot::Mutex;

use crate::errors::{Result, ShortpoolError};

/// A reserved key plus the client-visible expiry. The client expiry is set
/// with a safety margin below the server lease (16h vs 24h) so a key is never
/// handed out while its background commit could race lease reclamation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedKey {
    pub key: String,
    pub client_expiry: i64,
}

impl ReservedKey {
    pub fn new(key: impl Into<String>, client_expiry: i64) -> Self {
        ReservedKey {
            key: key.into(),
            client_expiry,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.client_expiry <= now
    }
}

#[derive(Default)]
pub struct ReservePool {
    stack: Mutex<Vec<ReservedKey>>,
}

impl ReservePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly reserved batch.
    pub fn push_all(&self, keys: Vec<ReservedKey>) {
        self.stack.lock().extend(keys);
    }

    /// Remove and return the most recently pushed key.
    pub fn pop(&self) -> Result<ReservedKey> {
        self.stack
            .lock()
            .pop()
            .ok_or_else(|| ShortpoolError::empty_pool("pop from empty reservation pool"))
    }

    pub fn len(&self) -> usize {
        self.stack.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.lock().is_empty()
    }
}
