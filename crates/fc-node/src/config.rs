//! Node configuration

use fc_ledger::LedgerConfig;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the registry node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeConfig {
    /// Ledger settings (difficulty, mining tuning)
    pub ledger: LedgerConfig,

    /// Directory for file bytes; `None` keeps them in memory
    pub store_dir: Option<PathBuf>,

    /// Chain snapshot file; `None` disables persistence
    pub snapshot_path: Option<PathBuf>,
}

impl NodeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FC_STORE_DIR`: file store directory (default: in-memory)
    /// - `FC_SNAPSHOT_PATH`: chain snapshot path (default: none)
    /// - plus everything [`LedgerConfig::from_env`] reads
    pub fn from_env() -> Self {
        Self {
            ledger: LedgerConfig::from_env(),
            store_dir: path_env("FC_STORE_DIR"),
            snapshot_path: path_env("FC_SNAPSHOT_PATH"),
        }
    }

    /// Override the difficulty
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.ledger.difficulty = difficulty;
        self
    }

    /// Override the file store directory
    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    /// Override the snapshot path
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }
}

fn path_env(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
