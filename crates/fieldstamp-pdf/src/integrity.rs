//! Integrity hashing for signed documents

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a byte stream.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
