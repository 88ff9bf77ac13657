//! Node assembly: wires the ledger, file store and snapshot store together

use crate::config::NodeConfig;
use crate::registry::{DuplicatePolicy, FileRegistry, Registration};
use fc_ledger::{
    Block, FileStore, FsFileStore, InMemoryFileStore, JsonSnapshotStore, Ledger, LedgerError,
    LedgerService, Result, SnapshotStore,
};
use fc_telemetry::log_event;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SUBSYSTEM: &str = "fc-node";

/// What happened to one file of a batch registration
#[derive(Debug)]
pub enum FileOutcome {
    /// Sealed into a new block
    Registered(Registration),
    /// Already on the chain and duplicates were refused
    Skipped {
        /// Content hash of the file
        file_hash: String,
        /// Earliest block carrying it
        existing: u64,
    },
}

/// Result of [`FileChainNode::register_paths`]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-file outcomes, in input order, up to the first failure
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
    /// File that stopped the batch and why
    pub failure: Option<(PathBuf, LedgerError)>,
    /// Whether the snapshot was rewritten
    pub persisted: bool,
}

impl BatchReport {
    /// Number of files sealed into new blocks
    pub fn registered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FileOutcome::Registered(_)))
            .count()
    }
}

/// Final path component, or the whole path if it has none
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A running registry node
pub struct FileChainNode {
    ledger: LedgerService,
    registry: FileRegistry,
    snapshots: Option<JsonSnapshotStore>,
}

impl FileChainNode {
    /// Build a node from configuration
    ///
    /// ## Startup Sequence
    ///
    /// 1. Validate the ledger configuration
    /// 2. Open the file store (directory or memory)
    /// 3. Restore the chain from the snapshot, or mine a fresh genesis
    /// 4. Report the restored chain's validity without refusing it
    pub async fn open(config: NodeConfig) -> Result<Self> {
        config.ledger.validate()?;

        let store: Arc<dyn FileStore> = match &config.store_dir {
            Some(dir) => Arc::new(FsFileStore::open(dir).await?),
            None => Arc::new(InMemoryFileStore::new()),
        };

        let snapshots = config.snapshot_path.as_ref().map(JsonSnapshotStore::new);
        let restored = match &snapshots {
            Some(store) => store.load().await?,
            None => None,
        };

        let ledger = match restored {
            Some(snapshot) => {
                if snapshot.difficulty != config.ledger.difficulty {
                    log_event!(
                        warn,
                        SUBSYSTEM,
                        "Keeping the snapshot's difficulty",
                        snapshot = snapshot.difficulty,
                        configured = config.ledger.difficulty
                    );
                }
                let ledger = Ledger::restore(snapshot, &config.ledger.mining)?;
                let validity = ledger.validate();
                log_event!(
                    info,
                    SUBSYSTEM,
                    "Chain restored from snapshot",
                    height = ledger.len(),
                    valid = validity.is_valid()
                );
                LedgerService::from_ledger(ledger)
            }
            None => LedgerService::spawn(config.ledger.clone()).await?,
        };

        let registry = FileRegistry::new(Arc::new(ledger.clone()), store);
        Ok(Self {
            ledger,
            registry,
            snapshots,
        })
    }

    /// Ledger service handle
    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    /// Upload and verify front-end
    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Save the chain if a snapshot path is configured
    ///
    /// Returns whether anything was written.
    pub async fn persist(&self) -> Result<bool> {
        let Some(store) = &self.snapshots else {
            return Ok(false);
        };
        let snapshot = self.ledger.snapshot()?;
        store.save(&snapshot).await?;
        log_event!(
            info,
            SUBSYSTEM,
            "Chain persisted",
            path = %store.path().display(),
            height = snapshot.blocks.len()
        );
        Ok(true)
    }

    /// Register files read from disk, one block each
    ///
    /// Stops at the first file that cannot be read or registered. Blocks
    /// sealed before that point are still persisted, so the snapshot never
    /// lags behind the files kept in the store. Under
    /// [`DuplicatePolicy::Reject`] a duplicate is skipped, not a failure.
    /// The returned error is only a persistence failure.
    pub async fn register_paths(
        &self,
        paths: &[PathBuf],
        policy: DuplicatePolicy,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for path in paths {
            let registered = match tokio::fs::read(path).await {
                Ok(bytes) => {
                    self.registry
                        .register(&display_name(path), bytes, policy)
                        .await
                }
                Err(e) => Err(e.into()),
            };
            match registered {
                Ok(registration) => report
                    .outcomes
                    .push((path.clone(), FileOutcome::Registered(registration))),
                Err(LedgerError::DuplicateFile {
                    file_hash,
                    existing,
                }) => report.outcomes.push((
                    path.clone(),
                    FileOutcome::Skipped {
                        file_hash,
                        existing,
                    },
                )),
                Err(e) => {
                    log_event!(
                        warn,
                        SUBSYSTEM,
                        "Batch stopped",
                        path = %path.display(),
                        error = %e
                    );
                    report.failure = Some((path.clone(), e));
                    break;
                }
            }
        }

        if report.registered() > 0 {
            report.persisted = self.persist().await?;
        }
        Ok(report)
    }

    /// Write the file registered at `index` to disk
    ///
    /// Without a destination the file lands in the current directory under
    /// the name recorded on the chain. Returns the block and the path written.
    pub async fn download_to(&self, index: u64, dest: Option<&Path>) -> Result<(Block, PathBuf)> {
        let (block, bytes) = self.registry.download_index(index).await?;
        let path = match dest {
            Some(dest) => dest.to_path_buf(),
            // Recorded names are not trusted as paths
            None => PathBuf::from(display_name(Path::new(&block.file_name))),
        };
        tokio::fs::write(&path, &bytes).await?;
        log_event!(
            info,
            SUBSYSTEM,
            "File downloaded",
            index,
            path = %path.display(),
            size = bytes.len()
        );
        Ok((block, path))
    }
}
