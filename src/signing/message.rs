//! The exact byte string a request signature covers

use crate::core::hash::sha256_hex;

/// Request body as it will be sent
#[derive(Debug, Clone, PartialEq)]
pub enum SignaturePayload {
    Bytes(Vec<u8>),
    Text(String),
    /// Serialised compactly with object keys in sorted order
    Json(serde_json::Value),
}

impl SignaturePayload {
    pub fn empty() -> Self {
        Self::Bytes(Vec::new())
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Json(value) => value.to_string().into_bytes(),
        }
    }
}

impl From<Vec<u8>> for SignaturePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for SignaturePayload {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for SignaturePayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for SignaturePayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for SignaturePayload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureComponents {
    pub payload: SignaturePayload,
    pub timestamp_nanos: u64,
    /// Address of the provider the request is sent to
    pub provider_address: String,
}

impl SignatureComponents {
    pub fn new(
        payload: impl Into<SignaturePayload>,
        timestamp_nanos: u64,
        provider_address: impl Into<String>,
    ) -> Self {
        Self {
            payload: payload.into(),
            timestamp_nanos,
            provider_address: provider_address.into(),
        }
    }
}

/// `hex(sha256(payload)) || decimal(timestamp_nanos) || provider_address`
pub fn build_signing_input(components: &SignatureComponents) -> Vec<u8> {
    let payload_hash = sha256_hex(&components.payload.canonical_bytes());
    let timestamp = components.timestamp_nanos.to_string();
    let mut input =
        Vec::with_capacity(payload_hash.len() + timestamp.len() + components.provider_address.len());
    input.extend_from_slice(payload_hash.as_bytes());
    input.extend_from_slice(timestamp.as_bytes());
    input.extend_from_slice(components.provider_address.as_bytes());
    input
}
