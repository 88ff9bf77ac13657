//! Proof-of-work nonce search

use super::entities::{Block, CandidateBlock};
use crate::config::MiningConfig;
use crate::error::{LedgerError, Result};
use crate::utils::hashing::{meets_difficulty, PayloadHasher};
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag that stops a running nonce search
///
/// Cloning yields another handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create an unset handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the search to stop at its next check
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A sealed block plus the cost of finding its nonce
#[derive(Clone, Debug)]
pub struct MinedBlock {
    /// The sealed block
    pub block: Block,
    /// Digests computed, including the winning one
    pub attempts: u64,
    /// Wall-clock time spent searching
    pub elapsed: Duration,
}

/// PoW nonce search service
///
/// Finds the smallest nonce, counting up from 0, whose digest has at
/// least `difficulty` leading zero hex characters. There is no attempt cap:
/// an uncancelled search runs until it succeeds.
#[derive(Clone, Debug)]
pub struct PoWMiner {
    difficulty: u32,
    cancel_check_interval: u64,
    progress_interval: u64,
}

impl PoWMiner {
    /// Create new miner for a fixed difficulty
    pub fn new(difficulty: u32, config: &MiningConfig) -> Self {
        Self {
            difficulty,
            cancel_check_interval: config.cancel_check_interval.max(1),
            progress_interval: config.progress_interval.max(1),
        }
    }

    /// Difficulty this miner seals to
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Seal a candidate, searching until a valid nonce is found
    pub fn seal(&self, candidate: CandidateBlock) -> Block {
        self.mine(candidate).block
    }

    /// Seal a candidate unless `cancel` is raised first
    ///
    /// A cancelled search yields [`LedgerError::MiningCancelled`] and no block.
    pub fn seal_cancellable(
        &self,
        candidate: CandidateBlock,
        cancel: &CancelHandle,
    ) -> Result<MinedBlock> {
        let index = candidate.index;
        self.search(candidate, || {
            if cancel.is_cancelled() {
                Err(LedgerError::MiningCancelled { index })
            } else {
                Ok(())
            }
        })
    }

    /// Seal a candidate and report the work done
    pub fn mine(&self, candidate: CandidateBlock) -> MinedBlock {
        match self.search(candidate, || Ok::<(), Infallible>(())) {
            Ok(mined) => mined,
            Err(never) => match never {},
        }
    }

    /// Nonce search, polling `check` before starting and every
    /// `cancel_check_interval` attempts; the first error it returns ends the search
    #[tracing::instrument(
        name = "pow_search",
        skip(self, candidate, check),
        fields(index = candidate.index, difficulty = self.difficulty)
    )]
    fn search<E>(
        &self,
        candidate: CandidateBlock,
        check: impl Fn() -> std::result::Result<(), E>,
    ) -> std::result::Result<MinedBlock, E> {
        check()?;

        let started = Instant::now();
        let hasher = PayloadHasher::new(&candidate.payload());
        let mut nonce = 0u64;
        let mut attempts = 0u64;

        loop {
            let hash = hasher.digest(nonce);
            attempts += 1;

            if meets_difficulty(&hash, self.difficulty) {
                let elapsed = started.elapsed();
                tracing::debug!(
                    nonce,
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    hash = %hash,
                    "PoW search succeeded"
                );
                return Ok(MinedBlock {
                    block: candidate.seal(nonce, hash),
                    attempts,
                    elapsed,
                });
            }

            if attempts % self.cancel_check_interval == 0 {
                if let Err(e) = check() {
                    tracing::info!(attempts, "PoW search cancelled");
                    return Err(e);
                }
            }

            if attempts % self.progress_interval == 0 {
                tracing::debug!(
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "PoW search in progress"
                );
            }

            // The nonce space wraps rather than capping the search
            nonce = nonce.wrapping_add(1);
        }
    }
}
