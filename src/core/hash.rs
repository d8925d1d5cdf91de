//! Hash utilities

use crate::core::types::Hash;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash::from_bytes(hasher.finalize().into())
}

/// Lowercase hex of the SHA-256 of data
pub fn sha256_hex(data: &[u8]) -> String {
    sha256(data).to_hex()
}

/// Compute SHA-256 hash over the concatenation of several byte slices
pub fn hash_chunks(chunks: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    Hash::from_bytes(hasher.finalize().into())
}

/// RIPEMD-160 of SHA-256, the account-id hash used for addresses
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = sha256(data);
    let mut hasher = Ripemd160::new();
    hasher.update(sha.as_bytes());
    hasher.finalize().into()
}
