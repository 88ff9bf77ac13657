//! Inbound ports (driving side - API)

use crate::domain::{Block, CancelHandle, ChainValidity, StorageRef};
use crate::error::Result;
use async_trait::async_trait;

/// Primary port: Ledger service
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Seal a new file record onto the chain
    async fn append(
        &self,
        file_hash: String,
        file_name: String,
        storage_ref: StorageRef,
    ) -> Result<Block>;

    /// Same as [`LedgerApi::append`], abandoning the search if `cancel` fires
    ///
    /// A cancelled append leaves the chain unchanged.
    async fn append_with_cancel(
        &self,
        file_hash: String,
        file_name: String,
        storage_ref: StorageRef,
        cancel: CancelHandle,
    ) -> Result<Block>;

    /// Every block registering `file_hash`, oldest first
    async fn find_by_file_hash(&self, file_hash: &str) -> Result<Vec<Block>>;

    /// Whether any block registers `file_hash`
    async fn has_file_hash(&self, file_hash: &str) -> Result<bool>;

    /// Boolean chain check
    async fn is_valid(&self) -> Result<bool>;

    /// Structured chain check
    async fn validate(&self) -> Result<ChainValidity>;

    /// Copy of every block, genesis first
    async fn blocks(&self) -> Result<Vec<Block>>;

    /// Copy of the most recent block
    async fn tip(&self) -> Result<Block>;

    /// Number of blocks including genesis
    async fn len(&self) -> Result<usize>;

    /// Current service status
    async fn status(&self) -> LedgerStatus;
}

/// Ledger service status
#[derive(Clone, Debug, Default)]
pub struct LedgerStatus {
    /// Blocks in the chain, including genesis
    pub height: u64,

    /// Difficulty the chain is sealed with
    pub difficulty: u32,

    /// Blocks appended this session
    pub blocks_appended: u64,

    /// Whether a nonce search is running
    pub mining: bool,

    /// Outcome of the validation run after the latest append
    pub last_validity: Option<ChainValidity>,

    /// Timestamp of the latest appended block (ms)
    pub last_block_at: Option<u64>,
}
