//! Endpoint resolution with proof-backed discovery

use crate::core::constants::DEFAULT_EPOCH;
use crate::core::error::{GonkaError, Result};
use crate::core::types::{Endpoint, Hash};
use crate::discovery::fetch::{
    fetch_allowed_transfer_addresses, fetch_node_identity, fetch_participants_with_proof,
    JsonFetcher,
};
use crate::discovery::endpoint::normalize_url;
use crate::discovery::selection::EndpointSelector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// How much a discovered participant list is trusted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryTrust {
    /// Participants must be proven against the block app hash
    #[default]
    Verified,
    /// Proof replay skipped. For testing against nodes without proofs only.
    InsecureUnverified,
}

/// What to do when the allow-list cannot be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllowListPolicy {
    /// Treat the allow-list as empty, dropping every discovered endpoint
    #[default]
    DropAll,
    /// Keep the discovered list unfiltered
    SkipFiltering,
}

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub source_url: String,
    pub epoch: String,
    pub trust: DiscoveryTrust,
    pub allow_list_policy: AllowListPolicy,
    /// When set, the payload's app hash must equal this before replay
    pub trusted_app_hash: Option<Hash>,
    pub apply_delegation: bool,
}

impl DiscoveryOptions {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            epoch: DEFAULT_EPOCH.to_string(),
            trust: DiscoveryTrust::Verified,
            allow_list_policy: AllowListPolicy::DropAll,
            trusted_app_hash: None,
            apply_delegation: true,
        }
    }
}

/// Inputs to [`resolve_endpoints`], in precedence order
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Caller-supplied endpoints, used as is
    pub explicit: Option<Vec<Endpoint>>,
    /// Endpoints from the environment, used as is
    pub environment: Option<Vec<Endpoint>>,
    pub discovery: Option<DiscoveryOptions>,
    /// Used when nothing above yields endpoints
    pub fallback: Vec<Endpoint>,
    pub selector: EndpointSelector,
}

/// Where a resolved endpoint list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionOrigin {
    Explicit,
    Environment,
    VerifiedDiscovery,
    UnverifiedDiscovery,
    Fallback,
}

impl fmt::Display for ResolutionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Explicit => "explicit",
            Self::Environment => "environment",
            Self::VerifiedDiscovery => "verified discovery",
            Self::UnverifiedDiscovery => "unverified discovery",
            Self::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub endpoints: Vec<Endpoint>,
    pub origin: ResolutionOrigin,
}

/// Resolve the endpoint list: explicit list, then environment list, then
/// discovery. Discovery failures of any kind fall back to `config.fallback`;
/// only an empty fallback set is an error.
pub fn resolve_endpoints(fetcher: &dyn JsonFetcher, config: &ResolverConfig) -> Result<Resolution> {
    let given = [
        (&config.explicit, ResolutionOrigin::Explicit),
        (&config.environment, ResolutionOrigin::Environment),
    ];
    for (endpoints, origin) in given {
        if let Some(endpoints) = endpoints.as_ref().filter(|e| !e.is_empty()) {
            info!("Using {} {} endpoint(s)", endpoints.len(), origin);
            return Ok(Resolution {
                endpoints: endpoints.clone(),
                origin,
            });
        }
    }

    if let Some(options) = &config.discovery {
        match discover(fetcher, options, &config.selector) {
            Ok(resolution) => return Ok(resolution),
            Err(e) => warn!(
                "Discovery from {} failed, using fallback endpoints: {}",
                options.source_url, e
            ),
        }
    }

    if config.fallback.is_empty() {
        return Err(GonkaError::no_endpoints(
            "no explicit endpoints, discovery unavailable and no fallback set",
        ));
    }
    info!("Using {} fallback endpoint(s)", config.fallback.len());
    Ok(Resolution {
        endpoints: config.fallback.clone(),
        origin: ResolutionOrigin::Fallback,
    })
}

/// Discover endpoints from a source without any fallback.
///
/// Steps run in order: fetch participants, replay the proof (unless
/// insecure), filter by the allow-list, then follow a delegate mapping
/// published by one selected endpoint.
pub fn discover(
    fetcher: &dyn JsonFetcher,
    options: &DiscoveryOptions,
    selector: &EndpointSelector,
) -> Result<Resolution> {
    let payload = fetch_participants_with_proof(fetcher, &options.source_url, &options.epoch)?;
    let origin = match options.trust {
        DiscoveryTrust::Verified => {
            payload.verify(options.trusted_app_hash.as_ref())?;
            ResolutionOrigin::VerifiedDiscovery
        }
        DiscoveryTrust::InsecureUnverified => {
            warn!(
                "Proof verification disabled; participants from {} are unverified",
                options.source_url
            );
            ResolutionOrigin::UnverifiedDiscovery
        }
    };

    let mut endpoints = payload.endpoints();
    match fetch_allowed_transfer_addresses(fetcher, &options.source_url) {
        Ok(allowed) => {
            let allowed: HashSet<String> = allowed.into_iter().collect();
            endpoints.retain(|e| allowed.contains(&e.address));
        }
        Err(e) => match options.allow_list_policy {
            AllowListPolicy::DropAll => {
                warn!("Allow-list fetch failed, dropping discovered endpoints: {}", e);
                endpoints.clear();
            }
            AllowListPolicy::SkipFiltering => {
                warn!("Allow-list fetch failed, keeping endpoints unfiltered: {}", e);
            }
        },
    }
    if endpoints.is_empty() {
        return Err(GonkaError::no_endpoints(
            "no discovered participant passed the allow-list",
        ));
    }

    if options.apply_delegation {
        let probed = selector.select(&endpoints)?;
        match fetch_node_identity(fetcher, &probed.url) {
            Ok(identity) if identity.has_delegates() => {
                // Delegates serve requests; the probed provider stays the signing counterparty
                endpoints = identity
                    .delegates()
                    .map(|(_, url)| Endpoint::new(normalize_url(url), probed.address.clone()))
                    .collect();
                info!(
                    "Provider {} delegates to {} endpoint(s)",
                    probed.address,
                    endpoints.len()
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Identity probe of {} failed: {}", probed.url, e),
        }
    }

    info!("Discovered {} endpoint(s) via {}", endpoints.len(), origin);
    Ok(Resolution { endpoints, origin })
}
