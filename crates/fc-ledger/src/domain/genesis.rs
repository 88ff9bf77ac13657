//! Genesis Block Creation
//!
//! The genesis block has fixed content and no real predecessor; only its
//! timestamp varies between sessions. It is sealed like any other block.

use super::entities::{Block, CandidateBlock, StorageRef};
use super::miner::PoWMiner;

/// File hash sentinel carried by genesis
pub const GENESIS_FILE_HASH: &str = "genesis_file_hash";

/// File name carried by genesis
pub const GENESIS_FILE_NAME: &str = "genesis";

/// Build the unsealed genesis candidate for the given creation time
pub fn genesis_candidate(timestamp: u64) -> CandidateBlock {
    CandidateBlock {
        index: 0,
        timestamp,
        file_hash: GENESIS_FILE_HASH.to_string(),
        file_name: GENESIS_FILE_NAME.to_string(),
        storage_ref: StorageRef::empty(),
        previous_hash: crate::GENESIS_PREVIOUS_HASH.to_string(),
    }
}

/// Creates and seals the genesis block
pub fn create_genesis_block(miner: &PoWMiner, timestamp: u64) -> Block {
    let block = miner.seal(genesis_candidate(timestamp));
    tracing::info!(
        hash = %block.hash,
        nonce = block.nonce,
        difficulty = miner.difficulty(),
        "[fc-ledger] Genesis block sealed"
    );
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MiningConfig;

    #[test]
    fn test_create_genesis_block() {
        let miner = PoWMiner::new(1, &MiningConfig::default());
        let genesis = create_genesis_block(&miner, 1_700_000_000_000);

        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, "0");
        assert_eq!(genesis.file_hash, GENESIS_FILE_HASH);
        assert_eq!(genesis.file_name, GENESIS_FILE_NAME);
        assert!(genesis.storage_ref.is_empty());
        assert!(genesis.is_genesis());
        assert!(genesis.is_sealed(1));
    }

    #[test]
    fn test_genesis_is_deterministic_for_a_timestamp() {
        let miner = PoWMiner::new(1, &MiningConfig::default());
        let a = create_genesis_block(&miner, 42);
        let b = create_genesis_block(&miner, 42);
        assert_eq!(a, b);
    }
}
