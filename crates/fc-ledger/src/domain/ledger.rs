//! The ledger: sole owner of the ordered block sequence

use super::entities::{Block, CandidateBlock, ChainSnapshot, StorageRef};
use super::genesis::create_genesis_block;
use super::invariants::{check_block, validate_chain, ChainValidity};
use super::miner::PoWMiner;
use crate::config::{LedgerConfig, MiningConfig};
use crate::error::{LedgerError, Result};
use crate::utils::hashing::DIGEST_HEX_LEN;

/// Hash-chained sequence of sealed file records
///
/// Created with a sealed genesis block; grows only through [`Ledger::append`]
/// or [`Ledger::commit`]; never shrinks or reorders. Corruption is something
/// [`Ledger::validate`] detects, not a state the ledger enters.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    difficulty: u32,
    miner: PoWMiner,
}

impl Ledger {
    /// Create a ledger and seal its genesis block
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        let miner = PoWMiner::new(config.difficulty, &config.mining);
        let genesis = create_genesis_block(&miner, now_millis());
        Ok(Self {
            chain: vec![genesis],
            difficulty: config.difficulty,
            miner,
        })
    }

    /// Create a ledger with default mining settings
    pub fn with_difficulty(difficulty: u32) -> Result<Self> {
        Self::new(&LedgerConfig::with_difficulty(difficulty))
    }

    /// Rebuild a ledger from a snapshot held by an external store
    ///
    /// The first block must be a genesis block (index 0, previous hash `"0"`).
    /// Other content is taken as-is; use [`Ledger::validate`] to detect tampering.
    pub fn restore(snapshot: ChainSnapshot, mining: &MiningConfig) -> Result<Self> {
        let config = LedgerConfig {
            difficulty: snapshot.difficulty,
            mining: mining.clone(),
        };
        config.validate()?;
        let Some(first) = snapshot.blocks.first() else {
            return Err(LedgerError::EmptyChain);
        };
        if !first.is_genesis() {
            return Err(LedgerError::MissingGenesis { index: first.index });
        }
        tracing::info!(
            blocks = snapshot.blocks.len(),
            difficulty = snapshot.difficulty,
            "[fc-ledger] Restored chain from snapshot"
        );
        Ok(Self {
            chain: snapshot.blocks,
            difficulty: snapshot.difficulty,
            miner: PoWMiner::new(snapshot.difficulty, mining),
        })
    }

    /// Copy of the whole chain for an external store
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            difficulty: self.difficulty,
            blocks: self.chain.clone(),
        }
    }

    /// Fixed difficulty of this chain
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Miner configured for this chain's difficulty
    pub fn miner(&self) -> &PoWMiner {
        &self.miner
    }

    /// Most recent block
    pub fn tip(&self) -> &Block {
        &self.chain[self.chain.len() - 1]
    }

    /// All blocks, genesis first
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Block at a position
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    /// Number of blocks including genesis
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: genesis exists from construction
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Build the next unsealed block on top of the current tip
    ///
    /// The index is the block's position, so it follows the tip's index on
    /// any chain that validates.
    pub fn prepare(
        &self,
        file_hash: impl Into<String>,
        file_name: impl Into<String>,
        storage_ref: StorageRef,
    ) -> CandidateBlock {
        let tip = self.tip();
        CandidateBlock {
            index: self.chain.len() as u64,
            timestamp: now_millis(),
            file_hash: file_hash.into(),
            file_name: file_name.into(),
            storage_ref,
            previous_hash: tip.hash.clone(),
        }
    }

    /// Push a block sealed elsewhere
    ///
    /// The block must extend the current tip and carry a valid seal; otherwise
    /// the chain is left untouched.
    pub fn commit(&mut self, block: Block) -> Result<Block> {
        let tip = self.tip();
        if block.previous_hash != tip.hash {
            return Err(LedgerError::StaleTip {
                expected: tip.hash.clone(),
                actual: block.previous_hash,
            });
        }
        let position = self.chain.len() as u64;
        if check_block(&block, tip, position, self.difficulty).is_err() {
            return Err(LedgerError::BrokenSeal { index: block.index });
        }
        self.chain.push(block.clone());
        Ok(block)
    }

    /// Seal and append a file record, returning the new block
    ///
    /// Duplicate file hashes are accepted; refusing them is caller policy.
    #[tracing::instrument(skip(self, file_hash, file_name, storage_ref), fields(index = self.chain.len()))]
    pub fn append(
        &mut self,
        file_hash: impl Into<String>,
        file_name: impl Into<String>,
        storage_ref: StorageRef,
    ) -> Block {
        let candidate = self.prepare(file_hash, file_name, storage_ref);
        let block = self.miner.seal(candidate);
        tracing::info!(
            index = block.index,
            nonce = block.nonce,
            hash = %block.hash,
            "[fc-ledger] Block appended"
        );
        self.chain.push(block.clone());
        block
    }

    /// Every block registering `file_hash`, oldest first
    pub fn find_by_file_hash(&self, file_hash: &str) -> Vec<Block> {
        self.chain
            .iter()
            .filter(|block| block.file_hash == file_hash)
            .cloned()
            .collect()
    }

    /// Whether any block registers `file_hash`
    pub fn has_file_hash(&self, file_hash: &str) -> bool {
        self.chain.iter().any(|block| block.file_hash == file_hash)
    }

    /// Walk the chain and report the first violation, if any
    pub fn validate(&self) -> ChainValidity {
        let validity = validate_chain(&self.chain, self.difficulty);
        if let ChainValidity::Invalid { index, reason } = &validity {
            tracing::warn!(index, %reason, "[fc-ledger] Chain validation failed");
        }
        validity
    }

    /// Boolean view of [`Ledger::validate`]
    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    #[cfg(test)]
    pub(crate) fn chain_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Maximum difficulty a chain can be configured with
pub const MAX_DIFFICULTY: u32 = DIGEST_HEX_LEN as u32;
