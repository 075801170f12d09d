//! Per-label serialization.
//!
//! The label is the unit of isolation: the conflict check and the
//! reconciliation that follows must run under the same lock so two requests
//! for one label cannot interleave. Different labels never contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily-populated map of per-label mutexes.
#[derive(Default)]
pub struct LabelLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LabelLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `label` (case-insensitive), waiting if another
    /// task holds it.
    pub async fn acquire(&self, label: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(label.to_lowercase())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
