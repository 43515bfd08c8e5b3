//! Session persistence.
//!
//! The whole [`Store`] is loaded and saved at once. `JsonFileStore` keeps it
//! in a single JSON file and replaces that file atomically on save;
//! `MemoryStore` keeps it in process memory.

use crate::session::Store;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Whole-store persistence.
///
/// `load` never fails: missing or unreadable data is an empty store.
/// Concurrent `load`/`save` cycles from different tasks race; the last save wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Store;

    async fn save(&self, store: &Store) -> StoreResult<()>;
}

// ============================================================================
// JSON File Store
// ============================================================================

/// Store backed by one pretty-printed JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn load(&self) -> Store {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Data file not found, starting empty");
                return Store::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read data file, starting empty");
                return Store::new();
            }
        };

        if content.trim().is_empty() {
            return Store::new();
        }

        match serde_json::from_str(&content) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Malformed data file, treating as empty");
                Store::new()
            }
        }
    }

    async fn save(&self, store: &Store) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(store)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        // Write a sibling file, then rename it over the target
        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), users = store.len(), "Store saved");
        Ok(())
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Store kept in process memory. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Store>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `store`.
    pub fn with_store(store: Store) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> Store {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Store {
        self.snapshot().await
    }

    async fn save(&self, store: &Store) -> StoreResult<()> {
        *self.inner.write().await = store.clone();
        Ok(())
    }
}
