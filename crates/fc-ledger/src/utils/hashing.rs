//! Hashing utilities for the ledger
//!
//! Every block digest is SHA-256 over a canonical byte encoding of the
//! block payload followed by the nonce, rendered as 64 lowercase hex
//! characters. The encoding is fixed:
//!
//! | Field | Encoding |
//! |-------|----------|
//! | index | u64 little-endian |
//! | timestamp | u64 little-endian (ms since epoch) |
//! | file_hash, file_name, storage id, storage url, previous_hash | u64 LE length + UTF-8 bytes |
//! | nonce | u64 little-endian |
//!
//! Length prefixes keep adjacent strings from bleeding into each other
//! (`"ab" + "c"` and `"a" + "bc"` encode differently).

use crate::domain::StorageRef;
use sha2::{Digest, Sha256};

/// Length of a digest in hex characters
pub const DIGEST_HEX_LEN: usize = 64;

/// Borrowed view of every hashed block field except the nonce
#[derive(Clone, Copy, Debug)]
pub struct BlockPayload<'a> {
    /// Block height
    pub index: u64,
    /// Creation time (ms since epoch)
    pub timestamp: u64,
    /// Registered content hash
    pub file_hash: &'a str,
    /// Display name
    pub file_name: &'a str,
    /// Storage pointer
    pub storage_ref: &'a StorageRef,
    /// Predecessor digest
    pub previous_hash: &'a str,
}

/// Compute SHA-256 hash of data
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex SHA-256 of raw file bytes.
///
/// This is the `file_hash` a caller supplies when registering a file.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}

/// Serialize the payload (everything but the nonce) canonically
pub fn serialize_block_payload(payload: &BlockPayload<'_>) -> Vec<u8> {
    let strings = [
        payload.file_hash,
        payload.file_name,
        payload.storage_ref.id.as_str(),
        payload.storage_ref.url.as_str(),
        payload.previous_hash,
    ];
    let mut bytes =
        Vec::with_capacity(16 + strings.iter().map(|s| 8 + s.len()).sum::<usize>());

    bytes.extend_from_slice(&payload.index.to_le_bytes());
    bytes.extend_from_slice(&payload.timestamp.to_le_bytes());
    for s in strings {
        bytes.extend_from_slice(&(s.len() as u64).to_le_bytes());
        bytes.extend_from_slice(s.as_bytes());
    }

    bytes
}

/// Digest of a payload sealed with `nonce`
pub fn block_digest(payload: &BlockPayload<'_>, nonce: u64) -> String {
    PayloadHasher::new(payload).digest(nonce)
}

/// Hasher primed with a payload so each nonce attempt only hashes 8 more bytes
#[derive(Clone)]
pub struct PayloadHasher {
    prefix: Sha256,
}

impl PayloadHasher {
    /// Prime the hasher with the canonical payload encoding
    pub fn new(payload: &BlockPayload<'_>) -> Self {
        Self {
            prefix: Sha256::new_with_prefix(serialize_block_payload(payload)),
        }
    }

    /// Digest for this payload with the given nonce
    #[inline]
    pub fn digest(&self, nonce: u64) -> String {
        hex::encode(self.prefix.clone().chain_update(nonce.to_le_bytes()).finalize())
    }
}

/// Number of leading `'0'` characters in a hex digest
#[inline]
pub fn leading_zeros(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

/// Check if hash meets difficulty
///
/// Returns true if the digest has at least `difficulty` leading zeros
#[inline]
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    leading_zeros(hash) >= difficulty as usize
}
