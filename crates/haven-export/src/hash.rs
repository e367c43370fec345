//! Per-file integrity hashing.

use sha2::{Digest, Sha256};

/// Lowercase hexadecimal SHA-256 of a blob, 64 characters.
pub fn compute_file_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
