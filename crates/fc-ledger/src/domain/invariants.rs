//! Invariant checkers for the chain
//!
//! These functions enforce the invariants that MUST hold for every sealed
//! block after genesis:
//!
//! 1. **Seal**: `hash` equals the recomputed digest of the other fields
//! 2. **Work**: `hash` has at least `difficulty` leading zero hex characters
//! 3. **Linkage**: `previous_hash` equals the predecessor's `hash`
//! 4. **Position**: `index` equals the block's position in the chain

use super::entities::Block;
use crate::utils::hashing::meets_difficulty;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which invariant a block violates
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidityReason {
    /// Stored hash differs from the recomputed digest
    HashMismatch {
        /// Hash stored on the block
        stored: String,
        /// Digest of the block's current fields
        computed: String,
    },

    /// `previous_hash` does not match the predecessor
    BrokenLink {
        /// Predecessor's hash
        expected: String,
        /// Hash the block links to
        actual: String,
    },

    /// Hash lacks the required leading zeros
    InsufficientWork {
        /// Difficulty the chain requires
        difficulty: u32,
    },

    /// Block index disagrees with its position
    IndexMismatch {
        /// Position in the chain
        expected: u64,
        /// Index stored on the block
        actual: u64,
    },
}

impl fmt::Display for InvalidityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HashMismatch { stored, computed } => {
                write!(f, "hash mismatch (stored {stored}, computed {computed})")
            }
            Self::BrokenLink { expected, actual } => {
                write!(f, "broken link (expected {expected}, found {actual})")
            }
            Self::InsufficientWork { difficulty } => {
                write!(f, "hash has fewer than {difficulty} leading zeros")
            }
            Self::IndexMismatch { expected, actual } => {
                write!(f, "index {actual} at position {expected}")
            }
        }
    }
}

/// Result of walking the chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainValidity {
    /// Every block satisfies every invariant
    Valid,

    /// First violation found, scanning from index 1
    Invalid {
        /// Position of the offending block
        index: u64,
        /// Which invariant failed
        reason: InvalidityReason,
    },
}

impl ChainValidity {
    /// Boolean view used by callers that only need pass/fail
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<ChainValidity> for bool {
    fn from(validity: ChainValidity) -> Self {
        validity.is_valid()
    }
}

impl fmt::Display for ChainValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid { index, reason } => write!(f, "invalid at block {index}: {reason}"),
        }
    }
}

/// INVARIANT-1: Seal
pub fn check_seal(block: &Block) -> Result<(), InvalidityReason> {
    let computed = block.compute_hash();
    if block.hash != computed {
        return Err(InvalidityReason::HashMismatch {
            stored: block.hash.clone(),
            computed,
        });
    }
    Ok(())
}

/// INVARIANT-2: Work
pub fn check_work(block: &Block, difficulty: u32) -> Result<(), InvalidityReason> {
    if !meets_difficulty(&block.hash, difficulty) {
        return Err(InvalidityReason::InsufficientWork { difficulty });
    }
    Ok(())
}

/// INVARIANT-3: Linkage
pub fn check_link(block: &Block, previous: &Block) -> Result<(), InvalidityReason> {
    if block.previous_hash != previous.hash {
        return Err(InvalidityReason::BrokenLink {
            expected: previous.hash.clone(),
            actual: block.previous_hash.clone(),
        });
    }
    Ok(())
}

/// INVARIANT-4: Position
pub fn check_position(block: &Block, position: u64) -> Result<(), InvalidityReason> {
    if block.index != position {
        return Err(InvalidityReason::IndexMismatch {
            expected: position,
            actual: block.index,
        });
    }
    Ok(())
}

/// Check one block against its predecessor, in invariant order 1, 3, 2, 4
pub fn check_block(
    block: &Block,
    previous: &Block,
    position: u64,
    difficulty: u32,
) -> Result<(), InvalidityReason> {
    check_seal(block)?;
    check_link(block, previous)?;
    check_work(block, difficulty)?;
    check_position(block, position)
}

/// Validate all invariants for a chain
///
/// Genesis is trusted; the walk starts at index 1 and stops at the first
/// violation.
pub fn validate_chain(blocks: &[Block], difficulty: u32) -> ChainValidity {
    for (position, pair) in blocks.windows(2).enumerate() {
        let position = position as u64 + 1;
        if let Err(reason) = check_block(&pair[1], &pair[0], position, difficulty) {
            return ChainValidity::Invalid {
                index: position,
                reason,
            };
        }
    }
    ChainValidity::Valid
}
