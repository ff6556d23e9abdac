//! Content hashing for preview/export parity checks.
//!
//! Timelines are hashed through their canonical JSON form so two processes
//! that planned the same inputs can compare a single digest.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ReelResult;

/// SHA-256 digest of a serialized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash the JSON serialization of `value`.
///
/// Struct fields serialize in declaration order, so equal values always
/// produce equal digests.
pub fn hash_json<T: Serialize>(value: &T) -> ReelResult<ContentHash> {
    let encoded = serde_json::to_vec(value)?;
    Ok(ContentHash(Sha256::digest(&encoded).into()))
}
