//! Core types and utilities
//!
//! This module contains the fundamental data types, error handling,
//! hashing helpers and network constants used throughout the crate.

pub mod constants;
pub mod error;
pub mod hash;
pub mod types;

// Re-export commonly used items
pub use error::{GonkaError, Result};
pub use hash::{hash160, hash_chunks, sha256, sha256_hex};
pub use types::{Endpoint, Hash};
