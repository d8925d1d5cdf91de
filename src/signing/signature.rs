//! Fixed-width low-S ECDSA signatures

use crate::core::error::{GonkaError, Result};
use crate::core::hash::sha256;
use crate::signing::key::PrivateKey;
use crate::signing::message::{build_signing_input, SignatureComponents};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, VerifyingKey};
use num_bigint::BigUint;
use once_cell::sync::Lazy;
use std::fmt;

/// `r32 || s32`
pub const SIGNATURE_LEN: usize = 64;

static CURVE_ORDER: Lazy<BigUint> = Lazy::new(|| {
    BigUint::from_bytes_be(&[
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xfe, 0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36,
        0x41, 0x41,
    ])
});

static HALF_ORDER: Lazy<BigUint> = Lazy::new(|| &*CURVE_ORDER >> 1u32);

/// Raw 64-byte signature, always in low-S form when produced by [`sign`]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawSignature([u8; SIGNATURE_LEN]);

impl RawSignature {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            GonkaError::signing_failed(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        Self::from_slice(&STANDARD.decode(encoded.trim())?)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..]
    }

    /// Header encoding
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn is_low_s(&self) -> bool {
        BigUint::from_bytes_be(self.s()) <= *HALF_ORDER
    }
}

impl fmt::Debug for RawSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSignature({})", hex::encode(self.0))
    }
}

fn left_pad_32(value: &BigUint) -> Result<[u8; 32]> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(GonkaError::signing_failed("signature scalar exceeds 32 bytes"));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Encode `(r, s)` as `r32 || s32`, replacing `s` by `n - s` when `s > n/2`
pub(crate) fn encode_low_s(r: &[u8], s: &[u8]) -> Result<RawSignature> {
    let r = BigUint::from_bytes_be(r);
    let mut s = BigUint::from_bytes_be(s);
    if s > *HALF_ORDER {
        s = &*CURVE_ORDER - &s;
    }
    let mut out = [0u8; SIGNATURE_LEN];
    out[..32].copy_from_slice(&left_pad_32(&r)?);
    out[32..].copy_from_slice(&left_pad_32(&s)?);
    Ok(RawSignature(out))
}

/// ECDSA over `sha256(message)`
pub fn sign_bytes(message: &[u8], key: &PrivateKey) -> Result<RawSignature> {
    let digest = sha256(message);
    let signature: Signature = key
        .signing_key()
        .sign_prehash(digest.as_bytes())
        .map_err(|e| GonkaError::signing_failed(e.to_string()))?;
    let (r, s) = signature.split_bytes();
    encode_low_s(&r, &s)
}

/// Sign the canonical signing input of `components`
pub fn sign(components: &SignatureComponents, key: &PrivateKey) -> Result<RawSignature> {
    sign_bytes(&build_signing_input(components), key)
}

/// Check a signature over `components` against a public key
pub fn verify(
    components: &SignatureComponents,
    signature: &RawSignature,
    public_key: &VerifyingKey,
) -> bool {
    let digest = sha256(&build_signing_input(components));
    Signature::from_slice(signature.as_bytes())
        .map(|sig| public_key.verify_prehash(digest.as_bytes(), &sig).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key_one() -> PrivateKey {
        PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000001")
            .unwrap()
    }

    #[test]
    fn test_high_s_is_folded() {
        let r = [0x01u8; 32];
        let high_s = (&*CURVE_ORDER - BigUint::from(5u32)).to_bytes_be();
        let sig = encode_low_s(&r, &high_s).unwrap();
        assert!(sig.is_low_s());
        assert_eq!(sig.s()[31], 5);
        assert!(sig.s()[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_short_scalars_are_padded() {
        let sig = encode_low_s(&[0x7f], &[0x01, 0x02]).unwrap();
        assert_eq!(sig.as_bytes().len(), SIGNATURE_LEN);
        assert_eq!(sig.r()[31], 0x7f);
        assert_eq!(&sig.s()[30..], &[0x01, 0x02]);
    }

    #[test]
    fn test_half_order_is_kept() {
        let sig = encode_low_s(&[1], &HALF_ORDER.to_bytes_be()).unwrap();
        assert_eq!(BigUint::from_bytes_be(sig.s()), *HALF_ORDER);
    }

    #[test]
    fn test_sign_is_deterministic() {
        let components = SignatureComponents::new("payload", 42, "gonka1provider");
        let a = sign(&components, &key_one()).unwrap();
        let b = sign(&components, &key_one()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_then_verify() {
        let key = key_one();
        let components = SignatureComponents::new("payload", 42, "gonka1provider");
        let sig = sign(&components, &key).unwrap();
        assert!(verify(&components, &sig, &key.verifying_key()));

        let tampered = SignatureComponents::new("payload", 43, "gonka1provider");
        assert!(!verify(&tampered, &sig, &key.verifying_key()));
    }

    #[test]
    fn test_base64_decode_encoded_signature() {
        let sig = sign_bytes(b"hello", &key_one()).unwrap();
        assert_eq!(RawSignature::from_base64(&sig.to_base64()).unwrap(), sig);
        assert!(RawSignature::from_slice(&[0u8; 63]).is_err());
    }
}
