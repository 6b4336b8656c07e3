use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-hub mutation locks. Every structural queue mutation holds its hub's
/// lock for the whole read-check-mutate sequence, so two mutations of the
/// same hub never interleave while independent hubs proceed in parallel.
#[derive(Default)]
pub struct HubLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl HubLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, hub_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("hub lock registry poisoned");
            Arc::clone(locks.entry(hub_id).or_default())
        };
        lock.lock_owned().await
    }
}
