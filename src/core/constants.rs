//! Network constants and environment variable names

use crate::core::types::Endpoint;

/// Private key used for signing
pub const ENV_PRIVATE_KEY: &str = "GONKA_PRIVATE_KEY";
/// Requester address override
pub const ENV_ADDRESS: &str = "GONKA_ADDRESS";
/// Explicit endpoint list, `url;address,url;address`
pub const ENV_ENDPOINTS: &str = "GONKA_ENDPOINTS";
/// Discovery source URL
pub const ENV_SOURCE_URL: &str = "GONKA_SOURCE_URL";
/// Set to `0` or `false` to skip proof verification during discovery
pub const ENV_VERIFY_PROOF: &str = "GONKA_VERIFY_PROOF";

/// Chain id used for address derivation; the prefix is the part before the first `-`
pub const DEFAULT_CHAIN_ID: &str = "gonka-mainnet";

/// Epoch requested from the discovery source
pub const DEFAULT_EPOCH: &str = "current";

/// Canonical version path segment that every service URL ends with
pub const API_VERSION_SEGMENT: &str = "/v1";

/// Timeout for discovery fetches
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Proof op type strings as they appear in ABCI query responses
pub const PROOF_OP_IAVL: &str = "ics23:iavl";
pub const PROOF_OP_SIMPLE: &str = "ics23:simple";

/// Fallback endpoint URLs used when discovery is unavailable.
///
/// These carry no provider address, so a client falling back to them refuses
/// to sign until `fallback_endpoints` (or an explicit list) supplies one.
pub const DEFAULT_ENDPOINT_URLS: &[&str] = &[
    "https://api.gonka.testnet.example.com",
    "https://api2.gonka.testnet.example.com",
    "https://api3.gonka.testnet.example.com",
];

/// The built-in fallback set as owned endpoints, with empty addresses
pub fn default_endpoints() -> Vec<Endpoint> {
    DEFAULT_ENDPOINT_URLS
        .iter()
        .map(|url| Endpoint::new(*url, ""))
        .collect()
}
