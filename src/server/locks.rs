//! Per-session-key mutual exclusion.
//!
//! The find → create-or-update → append sequence must be serialized per key
//! or two racing events could both observe "no session" and double-create.
//! A keyed lock map keeps unrelated keys fully concurrent; a global lock
//! would serialize every device behind every other one.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one session key, waiting behind earlier events
    /// for the same key. The map only ever grows; keys are small integers
    /// and a device produces a handful of sessions per day.
    pub async fn acquire(&self, session_key: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(session_key)
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}
