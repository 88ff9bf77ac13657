//! File store adapters
//!
//! Both stores key entries by a random v4 UUID, the way a browser-side file
//! cache would, and hand back a [`StorageRef`] pointing at it.

use crate::domain::StorageRef;
use crate::error::{LedgerError, Result};
use crate::ports::FileStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Volatile store for tests and single-session use
#[derive(Debug, Default)]
pub struct InMemoryFileStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn put(&self, _file_name: &str, bytes: Vec<u8>) -> Result<StorageRef> {
        let id = Uuid::new_v4().to_string();
        self.files.write().await.insert(id.clone(), bytes);
        let url = format!("mem://{id}");
        Ok(StorageRef::new(id, url))
    }

    async fn get(&self, id: &str) -> Result<Vec<u8>> {
        self.files
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::FileNotFound(id.to_string()))
    }

    async fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.files.read().await.contains_key(id))
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.files.write().await.remove(id).is_some())
    }
}

/// Store that writes each file to `<root>/<uuid>`
#[derive(Debug, Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "[fc-ledger] File store opened");
        Ok(Self { root })
    }

    /// Directory holding the files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        // ids are our own UUIDs; anything else could escape the root
        let id = Uuid::parse_str(id).map_err(|_| LedgerError::FileNotFound(id.to_string()))?;
        Ok(self.root.join(id.to_string()))
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn put(&self, file_name: &str, bytes: Vec<u8>) -> Result<StorageRef> {
        let id = Uuid::new_v4().to_string();
        let path = self.root.join(&id);
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(
            id = %id,
            file_name,
            size = bytes.len(),
            "[fc-ledger] File stored"
        );
        Ok(StorageRef::new(id, format!("file://{}", path.display())))
    }

    async fn get(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.path_for(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LedgerError::FileNotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn contains(&self, id: &str) -> Result<bool> {
        match self.path_for(id) {
            Ok(path) => Ok(tokio::fs::try_exists(path).await?),
            Err(_) => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let Ok(path) = self.path_for(id) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(id, "[fc-ledger] File removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
