//! File-backed state store.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use trucklog_core::error::AppError;
use trucklog_core::result::AppResult;
use trucklog_core::traits::state::StateStore;

/// Persists each key as one JSON file under a state directory.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    directory: PathBuf,
}

impl FileStateStore {
    /// Creates a store rooted at the given directory. The directory is
    /// created lazily on first save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, key: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::state(format!("Failed to load state '{key}': {e}"))),
        }
    }

    async fn save(&self, key: &str, value: &str) -> AppResult<()> {
        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| AppError::state(format!("Failed to create state directory: {e}")))?;
        fs::write(self.path_for(key), value)
            .await
            .map_err(|e| AppError::state(format!("Failed to save state '{key}': {e}")))
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::state(format!(
                "Failed to remove state '{key}': {e}"
            ))),
        }
    }
}
