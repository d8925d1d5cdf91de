//! Provider endpoint discovery
//!
//! Endpoints come from an explicit list, an environment-supplied list, or a
//! discovery source that serves the active participant set together with a
//! Merkle proof against the chain's app hash. Discovered endpoints are then
//! filtered by the on-chain allow-list and optionally redirected to a
//! provider's published delegate.

pub mod endpoint;
pub mod fetch;
pub mod payload;
pub mod resolver;
pub mod selection;

pub use endpoint::{base_url, normalize_url, parse_endpoint_list};
pub use fetch::{HttpFetcher, JsonFetcher, NodeIdentity};
pub use payload::ParticipantsWithProof;
pub use resolver::{
    discover, resolve_endpoints, AllowListPolicy, DiscoveryOptions, DiscoveryTrust, Resolution,
    ResolutionOrigin, ResolverConfig,
};
pub use selection::EndpointSelector;
