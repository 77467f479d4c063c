//! Per-ride mutual exclusion for in-process writers.
//!
//! Holding a ride's guard serialises the read-check-write cycle of the
//! mutating use cases, so requests served by the same process never race on
//! one ride. Writers in other processes are caught by the repository revision
//! check instead.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::RideId;

/// Registry size above which idle entries are dropped on the next acquire.
const PRUNE_THRESHOLD: usize = 1024;

/// Hands out one async lock per ride.
#[derive(Debug, Default)]
pub struct RideLocks {
    locks: Mutex<HashMap<RideId, Arc<AsyncMutex<()>>>>,
}

impl RideLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `ride_id`. Access ends when the guard drops.
    pub async fn acquire(&self, ride_id: RideId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() >= PRUNE_THRESHOLD {
                // Entries referenced only by the map have no holder or waiter.
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(ride_id).or_default())
        };
        lock.lock_owned().await
    }
}
