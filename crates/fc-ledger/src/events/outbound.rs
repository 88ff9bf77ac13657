//! Outbound events (published)

use crate::domain::{Block, ChainValidity};
use serde::{Deserialize, Serialize};

/// Event: Block sealed and appended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAppendedEvent {
    /// Event version
    pub version: u16,

    /// Block index
    pub index: u64,

    /// Block hash
    pub hash: String,

    /// Registered content hash
    pub file_hash: String,

    /// Display name
    pub file_name: String,

    /// Winning nonce
    pub nonce: u64,

    /// Digests computed while mining
    pub attempts: u64,

    /// Mining time in milliseconds
    pub mining_time_ms: u64,

    /// Block timestamp
    pub timestamp: u64,
}

impl BlockAppendedEvent {
    /// Current event schema version
    pub const VERSION: u16 = 1;

    /// Describe an appended block
    pub fn new(block: &Block, attempts: u64, mining_time_ms: u64) -> Self {
        Self {
            version: Self::VERSION,
            index: block.index,
            hash: block.hash.clone(),
            file_hash: block.file_hash.clone(),
            file_name: block.file_name.clone(),
            nonce: block.nonce,
            attempts,
            mining_time_ms,
            timestamp: block.timestamp,
        }
    }
}

/// Everything the ledger service publishes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    /// A block joined the chain
    BlockAppended(BlockAppendedEvent),

    /// The chain was re-checked after an append
    ChainValidated {
        /// Chain height at validation time
        height: u64,
        /// Outcome
        validity: ChainValidity,
    },

    /// A nonce search was abandoned; nothing was appended
    MiningCancelled {
        /// Index the candidate would have had
        index: u64,
    },
}
