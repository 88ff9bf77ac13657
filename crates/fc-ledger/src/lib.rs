//! # File-Chain - Ledger Engine
//!
//! **Bounded Context:** File provenance ledger
//! **Architecture Compliance:** DDD + Hexagonal + EDA + TDD
//!
//! ## Purpose
//!
//! The ledger records file-registration events as blocks in an append-only,
//! hash-chained sequence. Each block is sealed by a proof-of-work nonce so
//! that its SHA-256 digest starts with `difficulty` zero hex characters.
//! The chain can later be walked to prove no record was altered.
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - In-memory and filesystem file stores             │
//! │  - JSON snapshot store                              │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: LedgerApi                               │
//! │  - Outbound: FileStore, SnapshotStore               │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - Block, hashing, PoWMiner                         │
//! │  - Ledger (append, lookup, validate)                │
//! │  - Invariants: seal, work, linkage, position        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Seal**: `hash == digest(index, timestamp, file_hash, file_name, storage_ref, previous_hash, nonce)`
//! 2. **Work**: `hash` has at least `difficulty` leading zero hex characters
//! 3. **Linkage**: `previous_hash == chain[index - 1].hash`
//! 4. **Position**: the block at position `i` has `index == i`
//!
//! ## Usage Example
//!
//! ```rust
//! use fc_ledger::{Ledger, StorageRef};
//!
//! let mut ledger = Ledger::with_difficulty(1).unwrap();
//! let block = ledger.append("abc123", "report.pdf", StorageRef::empty());
//! assert!(block.hash.starts_with('0'));
//! assert!(ledger.is_valid());
//! assert_eq!(ledger.find_by_file_hash("abc123").len(), 1);
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: Pure ledger logic
//! - [`ports`]: Hexagonal architecture interfaces (inbound/outbound)
//! - [`adapters`]: File and snapshot stores
//! - [`events`]: Event schemas for EDA
//! - [`service`]: Async single-writer service with background mining

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Outbound port adapters
pub mod adapters;
/// Domain models and business logic
pub mod domain;
/// Event type definitions
pub mod events;
pub mod ports;
pub mod service;
pub mod utils;

mod config;
mod error;
mod metrics;

pub use config::{LedgerConfig, MiningConfig};
pub use error::{LedgerError, Result};
pub use metrics::LedgerMetrics;

// Re-export commonly used types
pub use domain::{
    Block, CancelHandle, CandidateBlock, ChainSnapshot, ChainValidity, InvalidityReason, Ledger,
    MinedBlock, PoWMiner, StorageRef, GENESIS_FILE_HASH, GENESIS_FILE_NAME, MAX_DIFFICULTY,
};

pub use ports::{FileStore, LedgerApi, LedgerStatus, SnapshotStore};

pub use events::{BlockAppendedEvent, LedgerEvent};

pub use adapters::{FsFileStore, InMemoryFileStore, JsonSnapshotStore};

pub use service::LedgerService;

pub use utils::hashing::content_hash;

/// Default proof-of-work difficulty (leading zero hex characters)
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// `previous_hash` sentinel carried by genesis
pub const GENESIS_PREVIOUS_HASH: &str = "0";
