//! Domain entities for the ledger

use crate::utils::hashing::{block_digest, meets_difficulty, BlockPayload};
use serde::{Deserialize, Serialize};

/// Pointer to file bytes held by an external store
///
/// Opaque to the ledger; empty for genesis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageRef {
    /// Content-addressing identifier
    pub id: String,

    /// Retrieval locator
    pub url: String,
}

impl StorageRef {
    /// Create a storage reference
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// The empty reference carried by genesis
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when neither field is set
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.url.is_empty()
    }
}

/// A block with every field fixed except the nonce
///
/// Produced by [`crate::Ledger::prepare`] and consumed by the miner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateBlock {
    /// Block height
    pub index: u64,
    /// Creation time (ms since epoch)
    pub timestamp: u64,
    /// Registered content hash
    pub file_hash: String,
    /// Display name
    pub file_name: String,
    /// Storage pointer
    pub storage_ref: StorageRef,
    /// Digest of the tail this candidate extends
    pub previous_hash: String,
}

impl CandidateBlock {
    /// Borrowed view for hashing
    pub fn payload(&self) -> BlockPayload<'_> {
        BlockPayload {
            index: self.index,
            timestamp: self.timestamp,
            file_hash: &self.file_hash,
            file_name: &self.file_name,
            storage_ref: &self.storage_ref,
            previous_hash: &self.previous_hash,
        }
    }

    /// Attach a found nonce and its digest
    pub fn seal(self, nonce: u64, hash: String) -> Block {
        Block {
            index: self.index,
            timestamp: self.timestamp,
            file_hash: self.file_hash,
            file_name: self.file_name,
            storage_ref: self.storage_ref,
            previous_hash: self.previous_hash,
            nonce,
            hash,
        }
    }
}

/// One sealed entry in the chain
///
/// Returned to callers by value; mutating a returned copy never touches
/// the stored chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain (genesis = 0)
    pub index: u64,

    /// Creation time (ms since epoch), never recomputed
    pub timestamp: u64,

    /// Content hash supplied by the caller
    pub file_hash: String,

    /// Display name, not covered by any linkage rule
    pub file_name: String,

    /// Where the file bytes live
    pub storage_ref: StorageRef,

    /// Digest of the preceding block ("0" for genesis)
    pub previous_hash: String,

    /// Nonce found by the miner
    pub nonce: u64,

    /// Digest over every other field
    pub hash: String,
}

impl Block {
    /// Borrowed view for hashing
    pub fn payload(&self) -> BlockPayload<'_> {
        BlockPayload {
            index: self.index,
            timestamp: self.timestamp,
            file_hash: &self.file_hash,
            file_name: &self.file_name,
            storage_ref: &self.storage_ref,
            previous_hash: &self.previous_hash,
        }
    }

    /// Recompute the digest from the current field values
    pub fn compute_hash(&self) -> String {
        block_digest(&self.payload(), self.nonce)
    }

    /// Stored digest matches the fields and satisfies `difficulty`
    pub fn is_sealed(&self, difficulty: u32) -> bool {
        self.hash == self.compute_hash() && meets_difficulty(&self.hash, difficulty)
    }

    /// True for the chain-initial block
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == crate::GENESIS_PREVIOUS_HASH
    }
}

/// Serializable image of a whole chain
///
/// Used by external stores to carry a session's chain across restarts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Difficulty the chain was sealed with
    pub difficulty: u32,

    /// Blocks from genesis to tip
    pub blocks: Vec<Block>,
}
