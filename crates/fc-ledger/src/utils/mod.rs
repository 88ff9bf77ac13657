//! Utility modules for the ledger

pub mod hashing;

pub use hashing::{
    block_digest, content_hash, meets_difficulty, serialize_block_payload, sha256, BlockPayload,
    PayloadHasher, DIGEST_HEX_LEN,
};
