//! Event schemas published by the ledger service

pub mod outbound;

pub use outbound::*;
