//! In-memory state store.

use async_trait::async_trait;
use dashmap::DashMap;

use trucklog_core::result::AppResult;
use trucklog_core::traits::state::StateStore;

/// Volatile state store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: DashMap<String, String>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn save(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_remove() {
        let store = MemoryStateStore::new();
        assert_eq!(store.load("missing").await.unwrap(), None);

        store.save("key", "value").await.unwrap();
        assert_eq!(store.load("key").await.unwrap(), Some("value".to_string()));

        store.remove("key").await.unwrap();
        assert_eq!(store.load("key").await.unwrap(), None);
    }
}
