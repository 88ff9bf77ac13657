//! Outbound ports (driven side - SPI)

use crate::domain::StorageRef;
use crate::error::Result;
use async_trait::async_trait;

/// Port: Hold file bytes outside the ledger
///
/// The ledger only ever sees the returned [`StorageRef`].
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store bytes and return where they can be fetched from
    async fn put(&self, file_name: &str, bytes: Vec<u8>) -> Result<StorageRef>;

    /// Fetch bytes by the id from a previous `put`
    async fn get(&self, id: &str) -> Result<Vec<u8>>;

    /// Whether an id is present
    async fn contains(&self, id: &str) -> Result<bool>;

    /// Drop the bytes behind an id; `false` if there were none
    async fn remove(&self, id: &str) -> Result<bool>;
}

/// Port: Keep chain snapshots between sessions
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, if any
    async fn load(&self) -> Result<Option<crate::domain::ChainSnapshot>>;

    /// Replace the saved snapshot
    async fn save(&self, snapshot: &crate::domain::ChainSnapshot) -> Result<()>;
}
