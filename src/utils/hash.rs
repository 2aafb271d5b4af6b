use sha2::{Digest, Sha256};

/// Compute the hex SHA-256 digest of a byte payload
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
