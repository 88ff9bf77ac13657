//! # File-Chain Node
//!
//! The registry runtime around the ledger engine.
//!
//! ## Flows
//!
//! ```text
//! upload ──→ FileRegistry::register ──→ FileStore::put ──→ LedgerService::append
//!                                                               │
//!                                                 [nonce search off the async runtime]
//!                                                               │
//!                                                               ↓
//!                                                        sealed Block
//!
//! verify ──→ FileRegistry::verify ──→ LedgerService::find_by_file_hash
//!
//! download ──→ FileRegistry::download_index ──→ FileStore::get ──→ hash re-check
//! ```
//!
//! ## Modular Structure
//!
//! - `config` - Node configuration from env and CLI flags
//! - `registry` - Upload, verify, history and download over the ledger
//! - `node` - Wiring of ledger, file store and snapshot persistence; batch
//!   registration from disk

#![warn(missing_docs)]

pub mod config;
pub mod node;
pub mod registry;

pub use config::NodeConfig;
pub use node::{display_name, BatchReport, FileChainNode, FileOutcome};
pub use registry::{DuplicatePolicy, FileRegistry, HistoryEntry, Registration, Verification};
