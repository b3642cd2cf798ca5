//! Opaque key-value persistence for client state.

use async_trait::async_trait;

use crate::result::AppResult;

/// Persists small client-state blobs (settings, read ledger) across sessions.
///
/// Keys are flat strings; values are opaque serialized payloads. The store
/// must tolerate missing keys (`Ok(None)`) and overwrite on save.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load a value by key, returning `None` when the key has never been saved.
    async fn load(&self, key: &str) -> AppResult<Option<String>>;

    /// Save a value under a key, overwriting any previous value.
    async fn save(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;
}
