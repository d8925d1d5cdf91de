//! Proof verification errors

use crate::codec::DecodeError;
use thiserror::Error;

/// Reasons a proof pair can fail to chain to the expected root
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("malformed proof data: {0}")]
    Decode(#[from] DecodeError),

    #[error("root hash is empty")]
    EmptyRootHash,

    #[error("expected exactly 2 proof ops, got {count}")]
    WrongProofOpCount { count: usize },

    #[error("proof op {index} has type {actual}, expected {expected}")]
    UnexpectedProofOpKind {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("unsupported proof shape: {reason}")]
    UnsupportedProofShape { reason: String },

    #[error("proof op {index}: proven key does not match the op key")]
    KeyMismatch { index: usize },

    #[error("proven value does not match the attested participant bytes")]
    ValueMismatch,

    #[error("multistore proof commits to store root {proven}, computed {computed}")]
    StoreRootMismatch { proven: String, computed: String },

    #[error("computed root {computed} does not match app hash {expected}")]
    RootMismatch { expected: String, computed: String },
}

impl ProofError {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedProofShape {
            reason: reason.into(),
        }
    }

    /// The proof bytes themselves were malformed
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// The proof was well formed but did not bind the claimed data to the root
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::KeyMismatch { .. }
                | Self::ValueMismatch
                | Self::StoreRootMismatch { .. }
                | Self::RootMismatch { .. }
        )
    }
}
