//! Concrete Ledger Service Implementation
//!
//! Wraps the synchronous [`Ledger`] for concurrent callers:
//!
//! - Appends are serialized through a single writer gate held across the
//!   whole read-tip → mine → commit sequence.
//! - The nonce search runs on the blocking thread pool, so no caller-facing
//!   task stalls on it.
//! - The ledger itself sits behind an `RwLock` that is only write-locked for
//!   the final push, so reads never wait on mining and always see a whole
//!   chain. The post-append validation walk runs under the read lock.

use crate::{
    config::LedgerConfig,
    domain::{Block, CancelHandle, ChainSnapshot, ChainValidity, Ledger, StorageRef},
    error::{LedgerError, Result},
    events::{BlockAppendedEvent, LedgerEvent},
    metrics::LedgerMetrics,
    ports::{LedgerApi, LedgerStatus},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Capacity of the event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Cloneable handle to one ledger instance
#[derive(Clone)]
pub struct LedgerService {
    inner: Arc<Inner>,
}

struct Inner {
    ledger: RwLock<Ledger>,
    writer: Mutex<()>,
    events: broadcast::Sender<LedgerEvent>,
    metrics: LedgerMetrics,
    mining: AtomicBool,
    last_validity: RwLock<Option<ChainValidity>>,
}

/// Resets the mining flag and stops an orphaned search when an append is dropped
struct MiningGuard<'a> {
    mining: &'a AtomicBool,
    cancel: CancelHandle,
    finished: bool,
}

impl<'a> MiningGuard<'a> {
    fn start(mining: &'a AtomicBool, cancel: CancelHandle) -> Self {
        mining.store(true, Ordering::SeqCst);
        Self {
            mining,
            cancel,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for MiningGuard<'_> {
    fn drop(&mut self) {
        self.mining.store(false, Ordering::SeqCst);
        if !self.finished {
            self.cancel.cancel();
        }
    }
}

impl LedgerService {
    /// Create the service, sealing genesis on the blocking pool
    pub async fn spawn(config: LedgerConfig) -> Result<Self> {
        info!(
            "[fc-ledger] Initializing ledger service (difficulty {})",
            config.difficulty
        );
        let ledger = tokio::task::spawn_blocking(move || Ledger::new(&config))
            .await
            .map_err(|e| LedgerError::ServiceUnavailable(e.to_string()))??;
        Ok(Self::from_ledger(ledger))
    }

    /// Wrap an existing ledger (fresh or restored)
    pub fn from_ledger(ledger: Ledger) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                ledger: RwLock::new(ledger),
                writer: Mutex::new(()),
                events,
                metrics: LedgerMetrics::new(),
                mining: AtomicBool::new(false),
                last_validity: RwLock::new(None),
            }),
        }
    }

    /// Subscribe to ledger events
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.inner.events.subscribe()
    }

    /// Metrics for this instance
    pub fn metrics(&self) -> &LedgerMetrics {
        &self.inner.metrics
    }

    /// Copy of the chain for an external store
    pub fn snapshot(&self) -> Result<ChainSnapshot> {
        Ok(self.read()?.snapshot())
    }

    /// Difficulty the chain is sealed with
    pub fn difficulty(&self) -> Result<u32> {
        Ok(self.read()?.difficulty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>> {
        self.inner
            .ledger
            .read()
            .map_err(|e| LedgerError::Internal(format!("ledger lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>> {
        self.inner
            .ledger
            .write()
            .map_err(|e| LedgerError::Internal(format!("ledger lock poisoned: {e}")))
    }

    fn publish(&self, event: LedgerEvent) {
        // No subscribers is not an error
        if self.inner.events.send(event).is_err() {
            debug!("[fc-ledger] Event dropped: no subscribers");
        }
    }

    async fn append_inner(
        &self,
        file_hash: String,
        file_name: String,
        storage_ref: StorageRef,
        cancel: CancelHandle,
    ) -> Result<Block> {
        let _writer = self.inner.writer.lock().await;

        let (candidate, miner) = {
            let ledger = self.read()?;
            (
                ledger.prepare(file_hash, file_name, storage_ref),
                ledger.miner().clone(),
            )
        };
        let index = candidate.index;
        debug!(index, "[fc-ledger] Mining candidate block");

        let guard = MiningGuard::start(&self.inner.mining, cancel.clone());
        let outcome =
            tokio::task::spawn_blocking(move || miner.seal_cancellable(candidate, &cancel)).await;
        guard.finish();

        let mined = match outcome {
            Ok(Ok(mined)) => mined,
            Ok(Err(err @ LedgerError::MiningCancelled { .. })) => {
                info!(index, "[fc-ledger] Append cancelled; chain unchanged");
                self.inner.metrics.record_cancellation();
                self.publish(LedgerEvent::MiningCancelled { index });
                return Err(err);
            }
            Ok(Err(err)) => return Err(err),
            Err(join) => return Err(LedgerError::ServiceUnavailable(join.to_string())),
        };

        let mining_time_ms = mined.elapsed.as_millis() as u64;
        let block = self.write()?.commit(mined.block)?;

        // The writer gate is still held, so the chain read here ends at `block`
        let (validity, height) = {
            let ledger = self.read()?;
            (ledger.validate(), ledger.len() as u64)
        };

        self.inner
            .metrics
            .record_block_appended(mined.attempts, mining_time_ms);
        self.inner.metrics.record_validation(validity.is_valid());
        if !validity.is_valid() {
            warn!(%validity, "[fc-ledger] Chain invalid after append");
        }
        if let Ok(mut last) = self.inner.last_validity.write() {
            *last = Some(validity.clone());
        }

        info!(
            index = block.index,
            nonce = block.nonce,
            attempts = mined.attempts,
            elapsed_ms = mining_time_ms,
            hash = %block.hash,
            "[fc-ledger] Block mined"
        );

        self.publish(LedgerEvent::BlockAppended(BlockAppendedEvent::new(
            &block,
            mined.attempts,
            mining_time_ms,
        )));
        self.publish(LedgerEvent::ChainValidated { height, validity });

        Ok(block)
    }
}

#[async_trait]
impl LedgerApi for LedgerService {
    async fn append(
        &self,
        file_hash: String,
        file_name: String,
        storage_ref: StorageRef,
    ) -> Result<Block> {
        self.append_inner(file_hash, file_name, storage_ref, CancelHandle::new())
            .await
    }

    async fn append_with_cancel(
        &self,
        file_hash: String,
        file_name: String,
        storage_ref: StorageRef,
        cancel: CancelHandle,
    ) -> Result<Block> {
        self.append_inner(file_hash, file_name, storage_ref, cancel)
            .await
    }

    async fn find_by_file_hash(&self, file_hash: &str) -> Result<Vec<Block>> {
        Ok(self.read()?.find_by_file_hash(file_hash))
    }

    async fn has_file_hash(&self, file_hash: &str) -> Result<bool> {
        Ok(self.read()?.has_file_hash(file_hash))
    }

    async fn is_valid(&self) -> Result<bool> {
        Ok(self.validate().await?.is_valid())
    }

    async fn validate(&self) -> Result<ChainValidity> {
        let validity = self.read()?.validate();
        self.inner.metrics.record_validation(validity.is_valid());
        Ok(validity)
    }

    async fn blocks(&self) -> Result<Vec<Block>> {
        Ok(self.read()?.blocks().to_vec())
    }

    async fn tip(&self) -> Result<Block> {
        Ok(self.read()?.tip().clone())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    async fn status(&self) -> LedgerStatus {
        let (height, difficulty, last_block_at) = match self.read() {
            Ok(ledger) => (
                ledger.len() as u64,
                ledger.difficulty(),
                (ledger.len() > 1).then(|| ledger.tip().timestamp),
            ),
            Err(_) => (0, 0, None),
        };
        LedgerStatus {
            height,
            difficulty,
            blocks_appended: self.inner.metrics.get_blocks_appended(),
            mining: self.inner.mining.load(Ordering::SeqCst),
            last_validity: self
                .inner
                .last_validity
                .read()
                .ok()
                .and_then(|v| v.clone()),
            last_block_at,
        }
    }
}
