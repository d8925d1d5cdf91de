//! ICS-23 existence proofs: message shapes, decoding and hash replay
//!
//! Only the subset needed to replay an existence proof is modelled. Fields
//! this module does not know are skipped; a known field with the wrong wire
//! type is rejected.

use crate::codec::reader::expect_wire;
use crate::codec::{encode_varint, DecodeError, Reader, WireType};
use crate::core::constants::{PROOF_OP_IAVL, PROOF_OP_SIMPLE};
use crate::core::hash::{hash_chunks, sha256};
use crate::core::types::Hash;
use crate::proofs::error::ProofError;
use std::fmt;

/// Hash function selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashOp {
    NoHash,
    Sha256,
    Sha512,
    Keccak256,
    Ripemd160,
    Bitcoin,
    Sha512_256,
    Unknown(i32),
}

impl From<i32> for HashOp {
    fn from(value: i32) -> Self {
        match value {
            0 => HashOp::NoHash,
            1 => HashOp::Sha256,
            2 => HashOp::Sha512,
            3 => HashOp::Keccak256,
            4 => HashOp::Ripemd160,
            5 => HashOp::Bitcoin,
            6 => HashOp::Sha512_256,
            other => HashOp::Unknown(other),
        }
    }
}

impl From<HashOp> for i32 {
    fn from(op: HashOp) -> Self {
        match op {
            HashOp::NoHash => 0,
            HashOp::Sha256 => 1,
            HashOp::Sha512 => 2,
            HashOp::Keccak256 => 3,
            HashOp::Ripemd160 => 4,
            HashOp::Bitcoin => 5,
            HashOp::Sha512_256 => 6,
            HashOp::Unknown(other) => other,
        }
    }
}

/// Length prefix applied to hashed key and value before leaf hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthOp {
    NoPrefix,
    VarProto,
    VarRlp,
    Fixed32Big,
    Fixed32Little,
    Fixed64Big,
    Fixed64Little,
    Require32Bytes,
    Require64Bytes,
    Unknown(i32),
}

impl From<i32> for LengthOp {
    fn from(value: i32) -> Self {
        match value {
            0 => LengthOp::NoPrefix,
            1 => LengthOp::VarProto,
            2 => LengthOp::VarRlp,
            3 => LengthOp::Fixed32Big,
            4 => LengthOp::Fixed32Little,
            5 => LengthOp::Fixed64Big,
            6 => LengthOp::Fixed64Little,
            7 => LengthOp::Require32Bytes,
            8 => LengthOp::Require64Bytes,
            other => LengthOp::Unknown(other),
        }
    }
}

impl From<LengthOp> for i32 {
    fn from(op: LengthOp) -> Self {
        match op {
            LengthOp::NoPrefix => 0,
            LengthOp::VarProto => 1,
            LengthOp::VarRlp => 2,
            LengthOp::Fixed32Big => 3,
            LengthOp::Fixed32Little => 4,
            LengthOp::Fixed64Big => 5,
            LengthOp::Fixed64Little => 6,
            LengthOp::Require32Bytes => 7,
            LengthOp::Require64Bytes => 8,
            LengthOp::Unknown(other) => other,
        }
    }
}

/// Rule turning a raw key/value pair into a leaf hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafOp {
    pub hash: HashOp,
    pub prehash_key: HashOp,
    pub prehash_value: HashOp,
    pub length: LengthOp,
    pub prefix: Vec<u8>,
}

impl Default for LeafOp {
    fn default() -> Self {
        Self {
            hash: HashOp::NoHash,
            prehash_key: HashOp::NoHash,
            prehash_value: HashOp::NoHash,
            length: LengthOp::NoPrefix,
            prefix: Vec::new(),
        }
    }
}

impl LeafOp {
    /// Leaf layout used by both IAVL and simple Tendermint stores
    pub fn tendermint(prefix: Vec<u8>) -> Self {
        Self {
            hash: HashOp::Sha256,
            prehash_key: HashOp::NoHash,
            prehash_value: HashOp::Sha256,
            length: LengthOp::VarProto,
            prefix,
        }
    }

    /// `sha256(prefix || varint(len(hkey)) || hkey || varint(len(hval)) || hval)`
    pub fn apply(&self, key: &[u8], value: &[u8]) -> Result<Hash, ProofError> {
        if self.hash != HashOp::Sha256 {
            return Err(ProofError::unsupported(format!(
                "leaf hash {:?}",
                self.hash
            )));
        }
        if self.length != LengthOp::VarProto {
            return Err(ProofError::unsupported(format!(
                "leaf length op {:?}",
                self.length
            )));
        }
        let hkey = prehash(self.prehash_key, key)?;
        let hval = prehash(self.prehash_value, value)?;
        let key_len = encode_varint(hkey.len() as u64);
        let value_len = encode_varint(hval.len() as u64);
        Ok(hash_chunks(&[
            self.prefix.as_slice(),
            &key_len,
            &hkey,
            &value_len,
            &hval,
        ]))
    }

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let mut leaf = LeafOp::default();
        while !reader.is_at_end() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1..=4 => {
                    expect_wire(field, wire_type, WireType::Varint)?;
                    let value = reader.read_int32()?;
                    match field {
                        1 => leaf.hash = value.into(),
                        2 => leaf.prehash_key = value.into(),
                        3 => leaf.prehash_value = value.into(),
                        _ => leaf.length = value.into(),
                    }
                }
                5 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    leaf.prefix = reader.read_bytes()?.to_vec();
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(leaf)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        for (field, value) in [
            (1, i32::from(self.hash)),
            (2, i32::from(self.prehash_key)),
            (3, i32::from(self.prehash_value)),
            (4, i32::from(self.length)),
        ] {
            if value != 0 {
                put_varint_field(out, field, value as i64 as u64);
            }
        }
        if !self.prefix.is_empty() {
            put_bytes_field(out, 5, &self.prefix);
        }
    }
}

fn prehash(op: HashOp, data: &[u8]) -> Result<Vec<u8>, ProofError> {
    match op {
        HashOp::NoHash => Ok(data.to_vec()),
        HashOp::Sha256 => Ok(sha256(data).as_bytes().to_vec()),
        other => Err(ProofError::unsupported(format!("prehash {other:?}"))),
    }
}

/// One step up the tree: `sha256(prefix || child || suffix)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerOp {
    pub hash: HashOp,
    pub prefix: Vec<u8>,
    pub suffix: Vec<u8>,
}

impl InnerOp {
    pub fn sha256(prefix: Vec<u8>, suffix: Vec<u8>) -> Self {
        Self {
            hash: HashOp::Sha256,
            prefix,
            suffix,
        }
    }

    pub fn apply(&self, child: &[u8]) -> Result<Hash, ProofError> {
        if self.hash != HashOp::Sha256 {
            return Err(ProofError::unsupported(format!(
                "inner hash {:?}",
                self.hash
            )));
        }
        Ok(hash_chunks(&[self.prefix.as_slice(), child, &self.suffix]))
    }

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let mut inner = InnerOp {
            hash: HashOp::NoHash,
            prefix: Vec::new(),
            suffix: Vec::new(),
        };
        while !reader.is_at_end() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    expect_wire(field, wire_type, WireType::Varint)?;
                    inner.hash = reader.read_int32()?.into();
                }
                2 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    inner.prefix = reader.read_bytes()?.to_vec();
                }
                3 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    inner.suffix = reader.read_bytes()?.to_vec();
                }
                _ => reader.skip(wire_type)?,
            }
        }
        Ok(inner)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let hash = i32::from(self.hash);
        if hash != 0 {
            put_varint_field(out, 1, hash as i64 as u64);
        }
        if !self.prefix.is_empty() {
            put_bytes_field(out, 2, &self.prefix);
        }
        if !self.suffix.is_empty() {
            put_bytes_field(out, 3, &self.suffix);
        }
    }
}

/// Proof that `key` maps to `value` under the root reached by `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceProof {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub leaf: LeafOp,
    pub path: Vec<InnerOp>,
}

impl ExistenceProof {
    /// Decode a `CommitmentProof` that must carry exactly one existence proof
    pub fn decode_commitment(data: &[u8]) -> Result<Self, ProofError> {
        if data.is_empty() {
            return Err(DecodeError::EmptyMessage.into());
        }
        let mut reader = Reader::new(data);
        let mut exist = None;
        while !reader.is_at_end() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    let body = reader.read_bytes()?;
                    if exist.is_some() {
                        return Err(ProofError::unsupported("repeated existence proof"));
                    }
                    exist = Some(Self::decode(body)?);
                }
                2 => return Err(ProofError::unsupported("non-existence proof")),
                3 => return Err(ProofError::unsupported("batch proof")),
                4 => return Err(ProofError::unsupported("compressed batch proof")),
                _ => reader.skip(wire_type)?,
            }
        }
        exist.ok_or_else(|| ProofError::unsupported("commitment proof has no existence proof"))
    }

    fn decode(data: &[u8]) -> Result<Self, ProofError> {
        let mut reader = Reader::new(data);
        let mut key = Vec::new();
        let mut value = Vec::new();
        let mut leaf = None;
        let mut path = Vec::new();
        while !reader.is_at_end() {
            let (field, wire_type) = reader.read_tag()?;
            match field {
                1 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    key = reader.read_bytes()?.to_vec();
                }
                2 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    value = reader.read_bytes()?.to_vec();
                }
                3 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    leaf = Some(LeafOp::decode(reader.read_bytes()?)?);
                }
                4 => {
                    expect_wire(field, wire_type, WireType::LengthDelimited)?;
                    path.push(InnerOp::decode(reader.read_bytes()?)?);
                }
                _ => reader.skip(wire_type)?,
            }
        }
        let leaf = leaf.ok_or_else(|| ProofError::unsupported("existence proof has no leaf op"))?;
        Ok(Self {
            key,
            value,
            leaf,
            path,
        })
    }

    /// Replay the leaf op and fold the inner ops in order
    pub fn calculate(&self) -> Result<Hash, ProofError> {
        let leaf_hash = self.leaf.apply(&self.key, &self.value)?;
        self.path
            .iter()
            .try_fold(leaf_hash, |current, step| step.apply(current.as_bytes()))
    }

    /// Encode as a `CommitmentProof` wrapping this existence proof
    pub fn encode_commitment(&self) -> Vec<u8> {
        let mut exist = Vec::new();
        if !self.key.is_empty() {
            put_bytes_field(&mut exist, 1, &self.key);
        }
        if !self.value.is_empty() {
            put_bytes_field(&mut exist, 2, &self.value);
        }
        let mut leaf = Vec::new();
        self.leaf.encode(&mut leaf);
        put_bytes_field(&mut exist, 3, &leaf);
        for step in &self.path {
            let mut inner = Vec::new();
            step.encode(&mut inner);
            put_bytes_field(&mut exist, 4, &inner);
        }
        let mut out = Vec::with_capacity(exist.len() + 4);
        put_bytes_field(&mut out, 1, &exist);
        out
    }
}

fn put_varint_field(out: &mut Vec<u8>, field: u32, value: u64) {
    out.extend(encode_varint(u64::from(field) << 3));
    out.extend(encode_varint(value));
}

fn put_bytes_field(out: &mut Vec<u8>, field: u32, bytes: &[u8]) {
    out.extend(encode_varint((u64::from(field) << 3) | 2));
    out.extend(encode_varint(bytes.len() as u64));
    out.extend_from_slice(bytes);
}

/// Store layer a proof op belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOpKind {
    Iavl,
    Simple,
    Other(String),
}

impl ProofOpKind {
    pub fn from_type(kind: &str) -> Self {
        match kind {
            PROOF_OP_IAVL => ProofOpKind::Iavl,
            PROOF_OP_SIMPLE => ProofOpKind::Simple,
            other => ProofOpKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProofOpKind::Iavl => PROOF_OP_IAVL,
            ProofOpKind::Simple => PROOF_OP_SIMPLE,
            ProofOpKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for ProofOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One proof step as carried by an ABCI query response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOp {
    pub kind: ProofOpKind,
    pub key: Vec<u8>,
    pub data: Vec<u8>,
}

impl ProofOp {
    pub fn new(kind: ProofOpKind, key: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            key: key.into(),
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_proof() -> ExistenceProof {
        ExistenceProof {
            key: b"key".to_vec(),
            value: b"value".to_vec(),
            leaf: LeafOp::tendermint(vec![0x00, 0x02, 0x02]),
            path: vec![
                InnerOp::sha256(vec![0x02, 0x04, 0x06, 0x20], vec![0x20; 3]),
                InnerOp::sha256(vec![0x01], Vec::new()),
            ],
        }
    }

    #[test]
    fn test_leaf_hash_layout() {
        let leaf = LeafOp::tendermint(vec![0x00]);
        let hashed_value = sha256(b"value");
        let mut preimage = vec![0x00, 0x03];
        preimage.extend_from_slice(b"key");
        preimage.push(0x20);
        preimage.extend_from_slice(hashed_value.as_bytes());
        assert_eq!(leaf.apply(b"key", b"value").unwrap(), sha256(&preimage));
    }

    #[test]
    fn test_inner_hash_layout() {
        let inner = InnerOp::sha256(b"pre".to_vec(), b"suf".to_vec());
        assert_eq!(inner.apply(b"child").unwrap(), sha256(b"prechildsuf"));
    }

    #[test]
    fn test_decode_encoded_proof() {
        let proof = sample_proof();
        let decoded = ExistenceProof::decode_commitment(&proof.encode_commitment()).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let proof = sample_proof();
        let mut data = proof.encode_commitment();
        // field 15 fixed32, field 16 varint
        data.extend_from_slice(&[0x7d, 1, 2, 3, 4, 0x80, 0x01, 0x05]);
        let decoded = ExistenceProof::decode_commitment(&data).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn test_empty_data() {
        let err = ExistenceProof::decode_commitment(&[]).unwrap_err();
        assert_eq!(err, ProofError::Decode(DecodeError::EmptyMessage));
    }

    #[test]
    fn test_truncated_data_is_decode_error() {
        let data = sample_proof().encode_commitment();
        let err = ExistenceProof::decode_commitment(&data[..data.len() - 3]).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_non_existence_proof_rejected() {
        let err = ExistenceProof::decode_commitment(&[0x12, 0x00]).unwrap_err();
        assert!(matches!(err, ProofError::UnsupportedProofShape { .. }));
    }

    #[test]
    fn test_repeated_existence_proof_rejected() {
        let mut data = sample_proof().encode_commitment();
        data.extend(sample_proof().encode_commitment());
        let err = ExistenceProof::decode_commitment(&data).unwrap_err();
        assert!(matches!(err, ProofError::UnsupportedProofShape { .. }));
    }

    #[test]
    fn test_missing_leaf_rejected() {
        // exist { key: "k" }
        let data = [0x0a, 0x03, 0x0a, 0x01, b'k'];
        let err = ExistenceProof::decode_commitment(&data).unwrap_err();
        assert!(matches!(err, ProofError::UnsupportedProofShape { .. }));
    }

    #[test]
    fn test_known_field_wrong_wire_type() {
        // exist as varint instead of length-delimited
        let err = ExistenceProof::decode_commitment(&[0x08, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            ProofError::Decode(DecodeError::WireTypeMismatch { field: 1, .. })
        ));
    }

    #[test]
    fn test_unsupported_hash_ops() {
        let mut proof = sample_proof();
        proof.leaf.hash = HashOp::Keccak256;
        assert!(matches!(
            proof.calculate(),
            Err(ProofError::UnsupportedProofShape { .. })
        ));

        let mut proof = sample_proof();
        proof.leaf.prehash_value = HashOp::Sha512;
        assert!(proof.calculate().is_err());

        let mut proof = sample_proof();
        proof.path[1].hash = HashOp::Unknown(42);
        assert!(proof.calculate().is_err());
    }

    #[test]
    fn test_enum_conversions() {
        for value in 0..=8 {
            assert_eq!(i32::from(LengthOp::from(value)), value);
        }
        for value in 0..=6 {
            assert_eq!(i32::from(HashOp::from(value)), value);
        }
        assert_eq!(HashOp::from(-1), HashOp::Unknown(-1));
    }

    #[test]
    fn test_proof_op_kind() {
        assert_eq!(ProofOpKind::from_type("ics23:iavl"), ProofOpKind::Iavl);
        assert_eq!(ProofOpKind::from_type("ics23:simple"), ProofOpKind::Simple);
        assert_eq!(
            ProofOpKind::from_type("iavl:v").to_string(),
            "iavl:v".to_string()
        );
    }
}
