//! Checksum calculation for written plans.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of serialized plan content.
///
/// # Arguments
/// * `content` - Serialized plan, exactly as written to disk
///
/// # Returns
/// Hexadecimal string representation of the hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
