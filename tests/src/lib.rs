//! # File-Chain Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── ledger_flows.rs     # Append, lookup, tamper detection, service concurrency
//!     └── registry_flows.rs   # Upload, verify, download, snapshot restarts
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fc-tests
//! cargo test -p fc-tests integration::ledger_flows
//! ```

pub mod integration;
