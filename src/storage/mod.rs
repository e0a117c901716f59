//! Store engine: the single durable owner of key -> url records.
//!
//! Backed by sled. Every mutating operation runs inside one sled transaction,
//! so probe-then-write sequences are atomic and two concurrent writers can
//! never claim the same key. The engine knows nothing about caching or
//! networking; cache nodes reach it through the `client` layer.

pub mod codec;
pub mod record;

use chrono::Utc;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use tracing::{debug, info};

use crate::errors::{Result, ShortpoolError};
pub use codec::{KEYSPACE_SIZE, MAX_KEY_LEN, MAX_URL_LEN};
pub use record::Record;

/// Server-side reservation lease.
pub const RESERVE_EXPIRY_SECS: i64 = 24 * 3600;

/// Upper bound on keys handed out by a single `reserve` call.
pub const MAX_RESERVE_NUM: usize = 1 << 16;

/// Probes per key before giving up with `ExhaustedKeyspace`.
pub const DEFAULT_PROBE_BUDGET: u32 = 64;

#[derive(Clone)]
pub struct UrlStore {
    db: sled::Db,
    keyspace: u64,
    probe_budget: u32,
}

impl UrlStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::open_with_limits(path, KEYSPACE_SIZE, DEFAULT_PROBE_BUDGET)
    }

    /// Open with an explicit keyspace size and probe budget. A tiny keyspace
    /// makes probe exhaustion reachable in tests.
    pub fn open_with_limits(
        path: impl AsRef<std::path::Path>,
        keyspace: u64,
        probe_budget: u32,
    ) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            keyspace,
            probe_budget,
            "url store opened"
        );
        Ok(UrlStore {
            db,
            keyspace,
            probe_budget,
        })
    }

    /// Store `url` under a fresh key and return the key.
    ///
    /// The probe loop and the write share one transaction; that atomicity is
    /// the sole mechanism keeping concurrent `store` calls collision-free.
    pub fn store(&self, url: &str) -> Result<String> {
        codec::validate_url(url)?;
        let key = self.db.transaction(|tx| {
            let now = Utc::now().timestamp();
            let key = self.probe_free_key(tx, now)?;
            let value = Record::resolved(url)
                .encode()
                .map_err(ConflictableTransactionError::Abort)?;
            tx.insert(key.as_bytes(), value)?;
            Ok(key)
        });
        let key = unwrap_transaction(key)?;
        self.db.flush()?;
        debug!(key = %key, "stored url");
        Ok(key)
    }

    /// Look up the url stored under `key`.
    ///
    /// A reserved-but-unresolved key reports `ReservedNotYetResolved`, never a
    /// bare `NotFound`; callers may flatten the two, the engine does not. An
    /// expired placeholder is reclaimable and reads as absent.
    pub fn query(&self, key: &str) -> Result<String> {
        match self.db.get(key.as_bytes())? {
            None => Err(ShortpoolError::not_found(format!("no such key: {}", key))),
            Some(raw) => {
                let record = Record::decode(&raw)?;
                if !record.is_placeholder() {
                    Ok(record.url)
                } else if record.lease_expired(Utc::now().timestamp()) {
                    Err(ShortpoolError::not_found(format!("no such key: {}", key)))
                } else {
                    Err(ShortpoolError::reserved_not_yet_resolved(format!(
                        "key reserved but not yet resolved: {}",
                        key
                    )))
                }
            }
        }
    }

    /// Reserve `num` fresh keys as placeholders with a 24h lease, returning
    /// them in order. One transaction covers the whole batch, so the returned
    /// keys are mutually distinct and durably marked taken before any cache
    /// node sees them.
    pub fn reserve(&self, num: usize) -> Result<Vec<String>> {
        if num == 0 || num > MAX_RESERVE_NUM {
            return Err(ShortpoolError::invalid_argument(format!(
                "reserve num {} out of range [1, {}]",
                num, MAX_RESERVE_NUM
            )));
        }
        let keys = self.db.transaction(|tx| {
            let now = Utc::now().timestamp();
            let value = Record::placeholder(now + RESERVE_EXPIRY_SECS)
                .encode()
                .map_err(ConflictableTransactionError::Abort)?;
            let mut keys = Vec::with_capacity(num);
            for _ in 0..num {
                // the probe sees this transaction's earlier inserts, so the
                // batch cannot hand out duplicates
                let key = self.probe_free_key(tx, now)?;
                tx.insert(key.as_bytes(), value.clone())?;
                keys.push(key);
            }
            Ok(keys)
        });
        let keys = unwrap_transaction(keys)?;
        self.db.flush()?;
        debug!(count = keys.len(), "reserved keys");
        Ok(keys)
    }

    /// Resolve a previously reserved key. Check-and-set in one transaction:
    /// the key must exist as a placeholder with a live lease, otherwise the
    /// commit is a `Conflict`. A key resolves at most once.
    pub fn commit(&self, key: &str, url: &str) -> Result<()> {
        if !codec::is_valid_key(key) {
            return Err(ShortpoolError::invalid_key(format!("invalid key: {}", key)));
        }
        codec::validate_url(url)?;
        let result = self.db.transaction(|tx| {
            let now = Utc::now().timestamp();
            let record = match tx.get(key.as_bytes())? {
                None => {
                    return Err(ConflictableTransactionError::Abort(
                        ShortpoolError::conflict(format!("key not reserved: {}", key)),
                    ));
                }
                Some(raw) => Record::decode(&raw).map_err(ConflictableTransactionError::Abort)?,
            };
            if !record.is_placeholder() {
                return Err(ConflictableTransactionError::Abort(
                    ShortpoolError::conflict(format!("key already resolved: {}", key)),
                ));
            }
            if record.lease_expired(now) {
                return Err(ConflictableTransactionError::Abort(
                    ShortpoolError::conflict(format!("reservation lease expired: {}", key)),
                ));
            }
            let value = Record::resolved(url)
                .encode()
                .map_err(ConflictableTransactionError::Abort)?;
            tx.insert(key.as_bytes(), value)?;
            Ok(())
        });
        unwrap_transaction(result)?;
        self.db.flush()?;
        debug!(key = %key, "committed reserved key");
        Ok(())
    }

    /// Draw random keys until one is unused. Expired placeholders count as
    /// free. Bounded by the probe budget; exhaustion aborts the transaction
    /// with a typed error instead of spinning as the keyspace fills.
    fn probe_free_key(
        &self,
        tx: &TransactionalTree,
        now: i64,
    ) -> std::result::Result<String, ConflictableTransactionError<ShortpoolError>> {
        for _ in 0..self.probe_budget {
            let candidate = codec::base62_encode(codec::random_key(self.keyspace));
            match tx.get(candidate.as_bytes())? {
                None => return Ok(candidate),
                Some(raw) => {
                    let record =
                        Record::decode(&raw).map_err(ConflictableTransactionError::Abort)?;
                    if record.lease_expired(now) {
                        return Ok(candidate);
                    }
                }
            }
        }
        Err(ConflictableTransactionError::Abort(
            ShortpoolError::exhausted_keyspace(format!(
                "no free key found in {} probes",
                self.probe_budget
            )),
        ))
    }

    /// Write a raw record, bypassing the probe loop. Test-support only.
    #[doc(hidden)]
    pub fn put_record_raw(&self, key: &str, record: &Record) -> Result<()> {
        self.db.insert(key.as_bytes(), record.encode()?)?;
        self.db.flush()?;
        Ok(())
    }
}

fn unwrap_transaction<T>(
    result: std::result::Result<T, TransactionError<ShortpoolError>>,
) -> Result<T> {
    result.map_err(ShortpoolError::from)
}
