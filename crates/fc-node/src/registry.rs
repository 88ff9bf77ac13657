//! File registry: the upload and verify flows on top of the ledger
//!
//! ```text
//! register:  bytes ─→ content_hash ─→ duplicate check ─→ FileStore::put ─→ LedgerApi::append
//! verify:    bytes ─→ content_hash ─→ LedgerApi::find_by_file_hash
//! history:   LedgerApi::blocks ─→ FileStore::contains per record
//! download:  block ─→ FileStore::get(storage_ref.id) ─→ hash re-check
//! ```

use fc_ledger::{content_hash, Block, FileStore, LedgerApi, LedgerError, Result};
use fc_telemetry::{log_block_event, log_event};
use serde::Serialize;
use std::sync::Arc;

const SUBSYSTEM: &str = "fc-node";

/// What to do when the uploaded bytes are already on the chain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Refuse with [`LedgerError::DuplicateFile`]
    #[default]
    Reject,
    /// Log a warning and register again
    Allow,
}

/// Outcome of a successful registration
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// The sealed block
    pub block: Block,

    /// Indices of earlier blocks with the same content
    pub earlier: Vec<u64>,
}

impl Registration {
    /// Whether this content had been registered before
    pub fn is_duplicate(&self) -> bool {
        !self.earlier.is_empty()
    }
}

/// Outcome of a verification lookup
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Content hash of the presented bytes
    pub file_hash: String,

    /// Every block registering that hash, oldest first
    pub matches: Vec<Block>,
}

/// One registered file as listed by [`FileRegistry::history`]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The block recording the file
    pub block: Block,

    /// Whether the store still holds the bytes
    pub available: bool,
}

impl Verification {
    /// Whether the content is on the chain
    pub fn is_registered(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Earliest registration, the provenance record
    pub fn first(&self) -> Option<&Block> {
        self.matches.first()
    }
}

/// Upload and verify front-end over a ledger and a file store
#[derive(Clone)]
pub struct FileRegistry {
    ledger: Arc<dyn LedgerApi>,
    store: Arc<dyn FileStore>,
}

impl FileRegistry {
    /// Create a registry over the given collaborators
    pub fn new(ledger: Arc<dyn LedgerApi>, store: Arc<dyn FileStore>) -> Self {
        Self { ledger, store }
    }

    /// Ledger handle
    pub fn ledger(&self) -> &Arc<dyn LedgerApi> {
        &self.ledger
    }

    /// Hash, store and seal an uploaded file
    ///
    /// The duplicate check and the append are not atomic: two concurrent
    /// uploads of the same bytes can both pass `Reject`. If the append fails
    /// the stored bytes are removed again.
    pub async fn register(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        policy: DuplicatePolicy,
    ) -> Result<Registration> {
        let file_hash = content_hash(&bytes);
        let earlier: Vec<u64> = self
            .ledger
            .find_by_file_hash(&file_hash)
            .await?
            .iter()
            .map(|block| block.index)
            .collect();

        if let Some(&existing) = earlier.first() {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(LedgerError::DuplicateFile {
                        file_hash,
                        existing,
                    });
                }
                DuplicatePolicy::Allow => {
                    log_event!(
                        warn,
                        SUBSYSTEM,
                        "File already registered, registering again",
                        file_hash = %file_hash,
                        file_name,
                        existing
                    );
                }
            }
        }

        let size = bytes.len();
        let storage_ref = self.store.put(file_name, bytes).await?;
        let stored_id = storage_ref.id.clone();
        let block = match self
            .ledger
            .append(file_hash, file_name.to_string(), storage_ref)
            .await
        {
            Ok(block) => block,
            Err(err) => {
                self.discard(&stored_id).await;
                return Err(err);
            }
        };

        log_block_event!(
            info,
            SUBSYSTEM,
            "File registered",
            block.index,
            block.hash,
            file_name,
            size
        );
        Ok(Registration { block, earlier })
    }

    async fn discard(&self, id: &str) {
        match self.store.remove(id).await {
            Ok(_) => log_event!(debug, SUBSYSTEM, "Dropped bytes of unsealed upload", id),
            Err(e) => log_event!(
                warn,
                SUBSYSTEM,
                "Could not drop bytes of unsealed upload",
                id,
                error = %e
            ),
        }
    }

    /// Look up presented bytes on the chain
    pub async fn verify(&self, bytes: &[u8]) -> Result<Verification> {
        let file_hash = content_hash(bytes);
        let matches = self.ledger.find_by_file_hash(&file_hash).await?;
        Ok(Verification { file_hash, matches })
    }

    /// Fetch a registered file's bytes back from the store
    ///
    /// Fails with [`LedgerError::Storage`] if the stored bytes no longer hash
    /// to the block's `file_hash`.
    pub async fn download(&self, block: &Block) -> Result<Vec<u8>> {
        if block.storage_ref.is_empty() {
            return Err(LedgerError::FileNotFound(block.file_name.clone()));
        }
        let bytes = self.store.get(&block.storage_ref.id).await?;
        if content_hash(&bytes) != block.file_hash {
            return Err(LedgerError::Storage(format!(
                "stored bytes for {} no longer match block {}",
                block.storage_ref.id, block.index
            )));
        }
        Ok(bytes)
    }

    /// Block at a chain position
    pub async fn block(&self, index: u64) -> Result<Block> {
        let blocks = self.ledger.blocks().await?;
        usize::try_from(index)
            .ok()
            .and_then(|i| blocks.into_iter().nth(i))
            .ok_or(LedgerError::BlockNotFound { index })
    }

    /// Fetch the bytes registered at a chain position
    pub async fn download_index(&self, index: u64) -> Result<(Block, Vec<u8>)> {
        let block = self.block(index).await?;
        let bytes = self.download(&block).await?;
        Ok((block, bytes))
    }

    /// Every file record on the chain, oldest first
    ///
    /// Genesis and other blocks without a storage reference are left out.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for block in self.ledger.blocks().await? {
            if block.storage_ref.is_empty() {
                continue;
            }
            let available = self.store.contains(&block.storage_ref.id).await?;
            entries.push(HistoryEntry { block, available });
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for FileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRegistry").finish_non_exhaustive()
    }
}
