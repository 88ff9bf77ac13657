//! Error types for the ledger subsystem

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while building, extending or serving the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Difficulty can never be satisfied by a hex digest of this length
    #[error("Difficulty {difficulty} exceeds digest length {max}")]
    DifficultyTooHigh {
        /// Requested difficulty
        difficulty: u32,
        /// Maximum attainable difficulty
        max: u32,
    },

    /// Nonce search was cancelled before a valid nonce was found
    #[error("Mining cancelled for block {index}")]
    MiningCancelled {
        /// Index of the block that was being sealed
        index: u64,
    },

    /// A sealed block no longer links to the chain tip
    #[error("Stale tip: block links to {actual}, tip is {expected}")]
    StaleTip {
        /// Current tip hash
        expected: String,
        /// Hash the block links to
        actual: String,
    },

    /// A block offered for commit does not carry a valid seal
    #[error("Block {index} is not correctly sealed")]
    BrokenSeal {
        /// Index of the offending block
        index: u64,
    },

    /// A snapshot without a genesis block
    #[error("Chain is empty")]
    EmptyChain,

    /// A snapshot whose first block is not a genesis block
    #[error("Snapshot starts at block {index}, not genesis")]
    MissingGenesis {
        /// Index carried by the first block
        index: u64,
    },

    /// No block at this position
    #[error("Block {index} not found")]
    BlockNotFound {
        /// Requested position
        index: u64,
    },

    /// The ledger service or its worker is gone
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// File store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// File store has no entry for this id
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File hash already registered and duplicates were refused
    #[error("File {file_hash} already registered in block {existing}")]
    DuplicateFile {
        /// Content hash of the file
        file_hash: String,
        /// Index of the earliest block carrying it
        existing: u64,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Check if error is recoverable (caller may retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MiningCancelled { .. } | Self::StaleTip { .. } | Self::Storage(_)
        )
    }

    /// Check if error is critical (session should stop)
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::DifficultyTooHigh { .. }
                | Self::ServiceUnavailable(_)
                | Self::Internal(_)
        )
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(err.to_string())
        } else {
            Self::Storage(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
