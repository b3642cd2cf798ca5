//! Persisted read-state ledger.
//!
//! The notification record is an immutable snapshot of server/local state;
//! read marking is a cross-cutting concern persisted separately, so user
//! action survives full store rebuilds from the backend. An id present in
//! the ledger is read regardless of how many times the record is rebuilt.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::warn;

use trucklog_core::traits::state::StateStore;

/// State-store key holding the ledger payload.
const READ_LEDGER_KEY: &str = "notifications.read";

/// The set of notification ids the user has read.
pub struct ReadLedger {
    /// Backing persistence.
    store: Arc<dyn StateStore>,
    /// In-memory id set.
    ids: Mutex<HashSet<String>>,
}

impl ReadLedger {
    /// Loads the ledger from the state store; an absent or malformed
    /// payload yields an empty ledger.
    pub async fn load(store: Arc<dyn StateStore>) -> Self {
        let ids = match store.load(READ_LEDGER_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => list.into_iter().collect(),
                Err(e) => {
                    warn!(error = %e, "Discarding malformed read ledger");
                    HashSet::new()
                }
            },
            Ok(None) => HashSet::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load read ledger");
                HashSet::new()
            }
        };

        Self {
            store,
            ids: Mutex::new(ids),
        }
    }

    /// Whether an id has been marked read.
    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    /// Marks one id read and persists the ledger.
    pub async fn mark(&self, id: &str) {
        let newly_added = self
            .ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string());
        if newly_added {
            self.persist().await;
        }
    }

    /// Marks many ids read and persists once.
    pub async fn mark_many(&self, ids: impl IntoIterator<Item = String>) {
        let mut changed = false;
        {
            let mut set = self.ids.lock().unwrap_or_else(|e| e.into_inner());
            for id in ids {
                changed |= set.insert(id);
            }
        }
        if changed {
            self.persist().await;
        }
    }

    /// Number of ids in the ledger.
    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the ledger back. A persistence failure keeps the in-memory
    /// set intact and is only logged.
    async fn persist(&self) {
        let list = {
            let set = self.ids.lock().unwrap_or_else(|e| e.into_inner());
            let mut list: Vec<String> = set.iter().cloned().collect();
            list.sort();
            list
        };
        let payload = match serde_json::to_string(&list) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Failed to serialize read ledger");
                return;
            }
        };
        if let Err(e) = self.store.save(READ_LEDGER_KEY, &payload).await {
            warn!(error = %e, "Failed to persist read ledger");
        }
    }
}
