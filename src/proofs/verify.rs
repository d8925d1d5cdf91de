//! Two-stage proof replay: IAVL store proof, then multistore proof

use crate::proofs::error::ProofError;
use crate::proofs::ics23::{ExistenceProof, ProofOp, ProofOpKind};
use tracing::debug;

/// Verify that `expected_value` is committed under `root_hash`.
///
/// `proof_ops` must be exactly `[iavl, simple]`. The IAVL op proves the value
/// under its store root; the simple op must prove that store root under
/// `root_hash`. Every comparison is byte-for-byte and any mismatch fails.
pub fn verify(
    root_hash: &[u8],
    proof_ops: &[ProofOp],
    expected_value: &[u8],
) -> Result<(), ProofError> {
    if root_hash.is_empty() {
        return Err(ProofError::EmptyRootHash);
    }
    let [store_op, multistore_op] = proof_ops else {
        return Err(ProofError::WrongProofOpCount {
            count: proof_ops.len(),
        });
    };
    expect_kind(0, store_op, &ProofOpKind::Iavl)?;
    expect_kind(1, multistore_op, &ProofOpKind::Simple)?;

    let store_proof = ExistenceProof::decode_commitment(&store_op.data)?;
    if store_proof.key != store_op.key {
        return Err(ProofError::KeyMismatch { index: 0 });
    }
    if store_proof.value != expected_value {
        return Err(ProofError::ValueMismatch);
    }
    let store_root = store_proof.calculate()?;
    debug!("Store proof replayed to {}", store_root);

    let multistore_proof = ExistenceProof::decode_commitment(&multistore_op.data)?;
    if multistore_proof.key != multistore_op.key {
        return Err(ProofError::KeyMismatch { index: 1 });
    }
    if multistore_proof.value != store_root.as_bytes() {
        return Err(ProofError::StoreRootMismatch {
            proven: hex::encode(&multistore_proof.value),
            computed: store_root.to_hex(),
        });
    }
    let candidate_root = multistore_proof.calculate()?;
    debug!("Multistore proof replayed to {}", candidate_root);

    if candidate_root.as_bytes() != root_hash {
        return Err(ProofError::RootMismatch {
            expected: hex::encode(root_hash),
            computed: candidate_root.to_hex(),
        });
    }
    Ok(())
}

fn expect_kind(index: usize, op: &ProofOp, expected: &ProofOpKind) -> Result<(), ProofError> {
    if &op.kind == expected {
        Ok(())
    } else {
        Err(ProofError::UnexpectedProofOpKind {
            index,
            expected: expected.to_string(),
            actual: op.kind.to_string(),
        })
    }
}
