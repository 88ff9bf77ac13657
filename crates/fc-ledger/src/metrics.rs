//! Metrics collection for the ledger subsystem

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the ledger
#[derive(Debug, Default)]
pub struct LedgerMetrics {
    /// Total blocks appended
    pub blocks_appended: AtomicU64,

    /// Total digests computed while mining
    pub hash_attempts: AtomicU64,

    /// Total PoW mining time (milliseconds)
    pub mining_time_ms: AtomicU64,

    /// Total validation walks
    pub validations: AtomicU64,

    /// Validation walks that found a violation
    pub validation_failures: AtomicU64,

    /// Nonce searches abandoned
    pub mining_cancellations: AtomicU64,
}

impl LedgerMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an appended block
    pub fn record_block_appended(&self, attempts: u64, mining_time_ms: u64) {
        self.blocks_appended.fetch_add(1, Ordering::Relaxed);
        self.hash_attempts.fetch_add(attempts, Ordering::Relaxed);
        self.mining_time_ms
            .fetch_add(mining_time_ms, Ordering::Relaxed);
    }

    /// Record a validation walk
    pub fn record_validation(&self, valid: bool) {
        self.validations.fetch_add(1, Ordering::Relaxed);
        if !valid {
            self.validation_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a cancelled search
    pub fn record_cancellation(&self) {
        self.mining_cancellations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get blocks appended
    pub fn get_blocks_appended(&self) -> u64 {
        self.blocks_appended.load(Ordering::Relaxed)
    }

    /// Get average attempts per block
    pub fn get_avg_attempts_per_block(&self) -> f64 {
        let blocks = self.blocks_appended.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        self.hash_attempts.load(Ordering::Relaxed) as f64 / blocks as f64
    }

    /// Get average mining time (milliseconds)
    pub fn get_avg_mining_time(&self) -> f64 {
        let blocks = self.blocks_appended.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        self.mining_time_ms.load(Ordering::Relaxed) as f64 / blocks as f64
    }
}
