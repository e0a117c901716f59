//! Write-behind propagation queue.
//!
//! Fast-path creates answer the client from the reservation pool and hand the
//! durable commit to this queue; pool refills travel the same way. The queue
//! never blocks the response path: enqueue is try-send, a full queue drops
//! the task with a warning, and task failures are logged and discarded. A
//! dropped commit forfeits the reservation once its server lease lapses;
//! the fast path trades durability for availability.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, warn};

use crate::cache::{ReservePool, ReservedKey};
use crate::client::StoreClient;

/// Client-visible reservation lifetime: 8h under the 24h server lease, so a
/// key handed out by the pool always has lease headroom for its commit.
pub const CLIENT_RESERVE_EXPIRY_SECS: i64 = 16 * 3600;

#[derive(Debug, Clone)]
pub enum PropagateTask {
    /// Make a fast-path resolution durable.
    Commit { key: String, url: String },
    /// Top up the reservation pool.
    Refill { amount: usize },
}

pub struct Propagator {
    tx: mpsc::Sender<PropagateTask>,
}

impl Propagator {
    /// Spawn the worker loop. Tasks run concurrently up to `max_in_flight`;
    /// concurrent refills are allowed (they only spend lease capacity).
    pub fn spawn(
        client: Arc<dyn StoreClient>,
        pool: Arc<ReservePool>,
        queue_depth: usize,
        max_in_flight: usize,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<PropagateTask>(queue_depth);
        let limiter = Arc::new(Semaphore::new(max_in_flight.max(1)));

        tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                let Ok(permit) = limiter.clone().acquire_owned().await else {
                    break;
                };
                let client = client.clone();
                let pool = pool.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    run_task(task, client, pool).await;
                });
            }
            debug!("propagation queue closed");
        });

        Propagator { tx }
    }

    /// Hand a task to the worker without waiting. Never blocks.
    pub fn enqueue(&self, task: PropagateTask) {
        if let Err(e) = self.tx.try_send(task) {
            warn!(error = %e, "propagation queue rejected task, dropping");
        }
    }
}

async fn run_task(task: PropagateTask, client: Arc<dyn StoreClient>, pool: Arc<ReservePool>) {
    match task {
        PropagateTask::Commit { key, url } => {
            if let Err(e) = client.commit(&key, &url).await {
                // not retried: the resolution stays node-local until the
                // server lease reclaims the key
                warn!(key = %key, error = %e, "background commit failed");
            } else {
                debug!(key = %key, "background commit landed");
            }
        }
        PropagateTask::Refill { amount } => match client.reserve(amount).await {
            Ok(keys) => {
                let client_expiry = Utc::now().timestamp() + CLIENT_RESERVE_EXPIRY_SECS;
                let count = keys.len();
                pool.push_all(
                    keys.into_iter()
                        .map(|key| ReservedKey::new(key, client_expiry))
                        .collect(),
                );
                debug!(count, pool_size = pool.len(), "reservation pool refilled");
            }
            Err(e) => {
                warn!(error = %e, "reservation pool refill failed");
            }
        },
    }
}
