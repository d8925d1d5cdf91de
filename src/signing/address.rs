//! Bech32 account addresses

use crate::core::error::{GonkaError, Result};
use crate::core::hash::hash160;
use crate::core::types::Endpoint;
use crate::signing::key::PrivateKey;
use bech32::{FromBase32, ToBase32, Variant};

/// Human-readable address prefix for a chain id: the text before the first `-`
pub fn address_prefix(chain_id: &str) -> &str {
    chain_id.split('-').next().unwrap_or(chain_id)
}

/// `bech32(prefix, ripemd160(sha256(compressed_pubkey)))`
pub fn derive_address(key: &PrivateKey, prefix: &str) -> Result<String> {
    address_from_public_key(&key.public_key_compressed(), prefix)
}

pub fn address_from_public_key(public_key: &[u8], prefix: &str) -> Result<String> {
    let account_id = hash160(public_key);
    bech32::encode(prefix, account_id.to_base32(), Variant::Bech32)
        .map_err(|e| GonkaError::invalid_address(prefix, e.to_string()))
}

/// Decode and checksum-verify an address, returning its prefix and 20-byte account id
pub fn decode_address(address: &str) -> Result<(String, Vec<u8>)> {
    let (prefix, data, variant) =
        bech32::decode(address).map_err(|e| GonkaError::invalid_address(address, e.to_string()))?;
    if variant != Variant::Bech32 {
        return Err(GonkaError::invalid_address(address, "bech32m is not used for accounts"));
    }
    let account_id = Vec::<u8>::from_base32(&data)
        .map_err(|e| GonkaError::invalid_address(address, e.to_string()))?;
    if account_id.len() != 20 {
        return Err(GonkaError::invalid_address(
            address,
            format!("expected 20-byte account id, got {}", account_id.len()),
        ));
    }
    Ok((prefix, account_id))
}

/// Check that an endpoint's provider address is a real account address
/// before any signature is bound to it
pub fn validate_provider_address(endpoint: &Endpoint) -> Result<()> {
    if endpoint.address.trim().is_empty() {
        return Err(GonkaError::configuration(format!(
            "endpoint {} has no provider address; configure endpoints as \"url;address\"",
            endpoint.url
        )));
    }
    decode_address(&endpoint.address).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DEFAULT_CHAIN_ID;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_address_prefix() {
        assert_eq!(address_prefix(DEFAULT_CHAIN_ID), "gonka");
        assert_eq!(address_prefix("gonka"), "gonka");
        assert_eq!(address_prefix("cosmoshub-4-x"), "cosmoshub");
    }

    #[test]
    fn test_known_address() {
        let key = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            derive_address(&key, "gonka").unwrap(),
            "gonka1w508d6qejxtdg4y5r3zarvary0c5xw7k2gsyg6"
        );
    }

    #[test]
    fn test_decode_derived_address() {
        let key = PrivateKey::random();
        let address = derive_address(&key, "gonka").unwrap();
        let (prefix, account_id) = decode_address(&address).unwrap();
        assert_eq!(prefix, "gonka");
        assert_eq!(account_id, hash160(&key.public_key_compressed()).to_vec());
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let err = decode_address("gonka1w508d6qejxtdg4y5r3zarvary0c5xw7k2gsyg7").unwrap_err();
        assert!(matches!(err, GonkaError::InvalidAddress { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    #[case("transfer_address_1")]
    #[case("gonka1provider")]
    #[case("gonka1qyqszqgpqyqszqgpqyqszqgpqyqszqgpzxxq28")]
    fn test_provider_address_rejected(#[case] address: &str) {
        let endpoint = Endpoint::new("https://node.example/v1", address);
        let err = validate_provider_address(&endpoint).unwrap_err();
        assert!(err.is_configuration_error(), "{address:?} gave {err}");
    }

    #[test]
    fn test_provider_address_accepted() {
        let endpoint = Endpoint::new(
            "https://node.example/v1",
            "gonka1qyqszqgpqyqszqgpqyqszqgpqyqszqgpzxxq27",
        );
        assert!(validate_provider_address(&endpoint).is_ok());
    }
}
