//! Participants-with-proof response envelope

use crate::core::error::{GonkaError, Result};
use crate::core::types::{Endpoint, Hash};
use crate::discovery::endpoint::normalize_url;
use crate::proofs::{self, ProofOp, ProofOpKind};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Response of `GET <source>/v1/epochs/<epoch>/participants`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantsWithProof {
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_participants: ActiveParticipants,
    /// Hex of the exact bytes committed in the IAVL store
    #[serde(default)]
    pub active_participants_bytes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub proof_ops: ProofOps,
    #[serde(default, deserialize_with = "null_as_default")]
    pub block: Block,
    #[serde(default, deserialize_with = "null_as_default")]
    pub excluded_participants: Vec<ExcludedParticipant>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveParticipants {
    #[serde(default, deserialize_with = "null_as_default")]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub epoch_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Participant {
    /// Provider address
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub inference_url: Option<String>,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProofOps {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ops: Vec<RawProofOp>,
}

/// Proof op as transported: base64 key and data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProofOp {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub app_hash: Option<String>,
    #[serde(default)]
    pub header: Option<BlockHeader>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    #[serde(default)]
    pub app_hash: Option<String>,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludedParticipant {
    pub address: String,
}

/// Go servers encode nil slices and pointers as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ParticipantsWithProof {
    /// App hash from `block.app_hash`, else `block.header.app_hash`
    pub fn app_hash(&self) -> Result<Vec<u8>> {
        let encoded = non_empty(&self.block.app_hash)
            .or_else(|| self.block.header.as_ref().and_then(|h| non_empty(&h.app_hash)))
            .ok_or_else(|| GonkaError::invalid_payload("missing app_hash"))?;
        Ok(hex::decode(encoded)?)
    }

    /// The committed participant bytes the IAVL proof must attest to
    pub fn attested_value(&self) -> Result<Vec<u8>> {
        let encoded = non_empty(&self.active_participants_bytes)
            .ok_or_else(|| GonkaError::invalid_payload("missing active_participants_bytes"))?;
        Ok(hex::decode(encoded)?)
    }

    pub fn proof_ops(&self) -> Result<Vec<ProofOp>> {
        self.proof_ops
            .ops
            .iter()
            .map(|op| -> Result<ProofOp> {
                let key = STANDARD.decode(op.key.as_deref().unwrap_or_default())?;
                let data = STANDARD.decode(op.data.as_deref().unwrap_or_default())?;
                Ok(ProofOp::new(ProofOpKind::from_type(&op.kind), key, data))
            })
            .collect()
    }

    /// Check the participant bytes against the block app hash. When a
    /// trusted app hash is pinned, the payload must carry exactly that hash.
    pub fn verify(&self, trusted_app_hash: Option<&Hash>) -> Result<()> {
        let value = self.attested_value()?;
        let ops = self.proof_ops()?;
        let app_hash = self.app_hash()?;
        if let Some(trusted) = trusted_app_hash {
            if app_hash.as_slice() != trusted.as_bytes() {
                return Err(GonkaError::UntrustedAppHash {
                    expected: trusted.to_hex(),
                    actual: hex::encode(&app_hash),
                });
            }
        }
        proofs::verify(&app_hash, &ops, &value)?;
        debug!(
            "Verified {} participant bytes against app hash {}",
            value.len(),
            hex::encode(&app_hash)
        );
        Ok(())
    }

    /// Participants as endpoints, minus excluded addresses and entries
    /// lacking a URL or address. URLs are normalised to end in `/v1`.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        let excluded: HashSet<&str> = self
            .excluded_participants
            .iter()
            .map(|p| p.address.as_str())
            .collect();
        self.active_participants
            .participants
            .iter()
            .filter_map(|p| Some((non_empty(&p.inference_url)?, non_empty(&p.index)?)))
            .filter(|(_, address)| !excluded.contains(address))
            .map(|(url, address)| Endpoint::new(normalize_url(url), address))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_app_hash_locations() {
        let top: ParticipantsWithProof =
            serde_json::from_value(json!({ "block": { "app_hash": "ABCD" } })).unwrap();
        assert_eq!(top.app_hash().unwrap(), vec![0xab, 0xcd]);

        let nested: ParticipantsWithProof = serde_json::from_value(
            json!({ "block": { "app_hash": "", "header": { "app_hash": "0102" } } }),
        )
        .unwrap();
        assert_eq!(nested.app_hash().unwrap(), vec![0x01, 0x02]);

        let missing = ParticipantsWithProof::default();
        assert!(matches!(
            missing.app_hash(),
            Err(GonkaError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_endpoints_skip_incomplete_and_excluded() {
        let payload: ParticipantsWithProof = serde_json::from_value(json!({
            "active_participants": { "participants": [
                { "index": "gonka1a", "inference_url": "http://a:8000/" },
                { "index": "gonka1b", "inference_url": "http://b:8000" },
                { "index": "gonka1c", "inference_url": null },
                { "inference_url": "http://d:8000" },
                { "index": "gonka1e", "inference_url": "http://e:8000/v1" }
            ]},
            "excluded_participants": [ { "address": "gonka1b" } ]
        }))
        .unwrap();
        assert_eq!(
            payload.endpoints(),
            vec![
                Endpoint::new("http://a:8000/v1", "gonka1a"),
                Endpoint::new("http://e:8000/v1", "gonka1e"),
            ]
        );
    }

    #[test]
    fn test_proof_ops_decode_base64() {
        let payload: ParticipantsWithProof = serde_json::from_value(json!({
            "proof_ops": { "ops": [
                { "type": "ics23:iavl", "key": "aW5mZXJlbmNl", "data": "AQI=" },
                { "type": "other", "key": "", "data": "" }
            ]}
        }))
        .unwrap();
        let ops = payload.proof_ops().unwrap();
        assert_eq!(ops[0], ProofOp::new(ProofOpKind::Iavl, b"inference".to_vec(), vec![1, 2]));
        assert_eq!(ops[1].kind, ProofOpKind::Other("other".to_string()));
    }

    #[test]
    fn test_null_collections() {
        let payload: ParticipantsWithProof = serde_json::from_value(json!({
            "active_participants": { "participants": null },
            "proof_ops": null,
            "block": null,
            "excluded_participants": null
        }))
        .unwrap();
        assert!(payload.endpoints().is_empty());
        assert!(payload.proof_ops().unwrap().is_empty());
    }

    #[test]
    fn test_bad_base64_is_error() {
        let payload: ParticipantsWithProof = serde_json::from_value(json!({
            "proof_ops": { "ops": [ { "type": "ics23:iavl", "key": "!!", "data": "" } ] }
        }))
        .unwrap();
        assert!(matches!(payload.proof_ops(), Err(GonkaError::Base64Error(_))));
    }

    #[test]
    fn test_verify_requires_attested_bytes() {
        let payload = ParticipantsWithProof::default();
        assert!(matches!(
            payload.verify(None),
            Err(GonkaError::InvalidPayload { .. })
        ));
    }
}
