//! Domain layer - Pure ledger logic
//!
//! This module contains the core domain entities and services. All code
//! here is synchronous and free of I/O; the async service layer wraps it.
//!
//! ## Entities
//!
//! - [`Block`]: One sealed file record
//! - [`CandidateBlock`]: A block awaiting its nonce
//! - [`StorageRef`]: Opaque pointer to externally stored bytes
//! - [`ChainSnapshot`]: Serializable image of a chain
//!
//! ## Services
//!
//! - [`PoWMiner`]: Smallest-nonce leading-zero search
//! - [`Ledger`]: Owner of the chain (append, lookup, validation)

mod entities;
pub mod genesis;
pub mod invariants;
pub mod ledger;
pub mod miner;

pub use entities::*;
pub use genesis::*;
pub use invariants::{validate_chain, ChainValidity, InvalidityReason};
pub use ledger::{now_millis, Ledger, MAX_DIFFICULTY};
pub use miner::{CancelHandle, MinedBlock, PoWMiner};
