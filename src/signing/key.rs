//! secp256k1 private key handling

use crate::core::error::{GonkaError, Result};
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;

/// A secp256k1 signing key. Never printed.
#[derive(Clone)]
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Parse a 32-byte hex key, with or without a `0x` prefix
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let trimmed = hex_key.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if stripped.is_empty() {
            return Err(GonkaError::invalid_private_key("key is empty"));
        }
        let bytes = hex::decode(stripped)
            .map_err(|e| GonkaError::invalid_private_key(format!("not valid hex: {}", e)))?;
        if bytes.len() != 32 {
            return Err(GonkaError::invalid_private_key(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|_| GonkaError::invalid_private_key("scalar is zero or exceeds the curve order"))?;
        Ok(Self { signing_key })
    }

    /// Fresh key from the operating system RNG
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// SEC1 compressed public key
    pub fn public_key_compressed(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}
