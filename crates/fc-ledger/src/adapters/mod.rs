//! Adapters for the outbound ports

pub mod file_store;
pub mod snapshot_store;

pub use file_store::{FsFileStore, InMemoryFileStore};
pub use snapshot_store::JsonSnapshotStore;
