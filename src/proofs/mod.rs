//! Existence-proof verification for discovery payloads
//!
//! A discovery payload attests to the active participant list with two
//! chained ICS-23 existence proofs: an IAVL store proof for the participant
//! record, and a simple multi-store proof binding that store's root to the
//! block app hash. [`verify`] replays both and fails closed on any mismatch.

pub mod error;
pub mod ics23;
pub mod verify;

// Re-export commonly used items
pub use error::ProofError;
pub use ics23::{ExistenceProof, HashOp, InnerOp, LeafOp, LengthOp, ProofOp, ProofOpKind};
pub use verify::verify;
