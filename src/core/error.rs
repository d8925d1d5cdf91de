//! Error types for request signing and provider discovery

use crate::proofs::ProofError;
use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum GonkaError {
    /// Configuration errors, fatal at client construction
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("Invalid private key: {reason}")]
    InvalidPrivateKey { reason: String },

    #[error("Invalid endpoint format: {entry}. Expected format: \"url;address\"")]
    InvalidEndpoint { entry: String },

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid epoch")]
    InvalidEpoch,

    /// Discovery errors, converted into fallback decisions by the resolver
    #[error("Network error: {reason}")]
    NetworkError { reason: String },

    #[error("Request to {url} failed with status {status}")]
    ServerStatus { url: String, status: u16 },

    #[error("Invalid discovery payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Participants unverified: expected app hash {expected}, but got {actual}")]
    UntrustedAppHash { expected: String, actual: String },

    #[error("Proof verification failed: {0}")]
    Proof(#[from] ProofError),

    #[error("No endpoints available: {reason}")]
    NoEndpoints { reason: String },

    /// Signing errors, fatal for the request being signed
    #[error("Signing failed: {reason}")]
    SigningFailed { reason: String },

    #[error("No provider address found for URL: {url}")]
    NoProviderForUrl { url: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Hex encoding/decoding errors
    #[error("Hex encoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    #[error("Base64 decoding error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Home directory not found")]
    HomeDirectoryNotFound,
}

impl GonkaError {
    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    /// Create a new invalid private key error
    pub fn invalid_private_key(reason: impl Into<String>) -> Self {
        Self::InvalidPrivateKey {
            reason: reason.into(),
        }
    }

    /// Create a new invalid endpoint error
    pub fn invalid_endpoint(entry: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            entry: entry.into(),
        }
    }

    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error
    pub fn network(reason: impl Into<String>) -> Self {
        Self::NetworkError {
            reason: reason.into(),
        }
    }

    /// Create a new invalid payload error
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            reason: reason.into(),
        }
    }

    pub fn no_endpoints(reason: impl Into<String>) -> Self {
        Self::NoEndpoints {
            reason: reason.into(),
        }
    }

    /// Create a new signing failed error
    pub fn signing_failed(reason: impl Into<String>) -> Self {
        Self::SigningFailed {
            reason: reason.into(),
        }
    }

    /// Whether this error must stop client construction
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError { .. }
                | Self::InvalidPrivateKey { .. }
                | Self::InvalidEndpoint { .. }
                | Self::InvalidAddress { .. }
        )
    }
}

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, GonkaError>;
