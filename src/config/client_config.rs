//! Client configuration values

use crate::core::constants::{
    default_endpoints, DEFAULT_CHAIN_ID, DEFAULT_EPOCH, DEFAULT_REQUEST_TIMEOUT_SECS, ENV_ADDRESS,
    ENV_ENDPOINTS, ENV_PRIVATE_KEY, ENV_SOURCE_URL, ENV_VERIFY_PROOF,
};
use crate::core::error::{GonkaError, Result};
use crate::core::types::{Endpoint, Hash};
use crate::discovery::endpoint::parse_endpoint_list;
use crate::discovery::resolver::{
    AllowListPolicy, DiscoveryOptions, DiscoveryTrust, ResolverConfig,
};
use crate::discovery::selection::EndpointSelector;
use crate::signing::address::{address_prefix, derive_address};
use crate::signing::key::PrivateKey;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Every field is optional so layers can be merged; unset fields take the
/// documented defaults when read through the accessor methods.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Hex secp256k1 key, optional `0x` prefix
    pub private_key: Option<String>,
    /// Requester address; derived from the key when unset
    pub address: Option<String>,
    pub endpoints: Option<Vec<Endpoint>>,
    pub source_url: Option<String>,
    /// `false` selects insecure, unverified discovery
    pub verify_proof: Option<bool>,
    pub epoch: Option<String>,
    pub chain_id: Option<String>,
    pub allow_list_policy: Option<AllowListPolicy>,
    /// Pinned app hash, hex
    pub trusted_app_hash: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub fallback_endpoints: Option<Vec<Endpoint>>,
    pub apply_delegation: Option<bool>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("address", &self.address)
            .field("endpoints", &self.endpoints)
            .field("source_url", &self.source_url)
            .field("verify_proof", &self.verify_proof)
            .field("epoch", &self.epoch)
            .field("chain_id", &self.chain_id)
            .field("allow_list_policy", &self.allow_list_policy)
            .field("trusted_app_hash", &self.trusted_app_hash)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("fallback_endpoints", &self.fallback_endpoints)
            .field("apply_delegation", &self.apply_delegation)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ClientConfig {
    /// Load from the default path, or defaults if the file does not exist
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            GonkaError::configuration(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| GonkaError::configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `~/.gonka/config.toml`
    pub fn get_config_path() -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or(GonkaError::HomeDirectoryNotFound)?;
        Ok(user_dirs.home_dir().join(".gonka").join("config.toml"))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Build the environment layer from any variable lookup
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoints = match non_empty(lookup(ENV_ENDPOINTS)) {
            Some(list) => Some(parse_endpoint_list(&list)?),
            None => None,
        };
        let verify_proof = non_empty(lookup(ENV_VERIFY_PROOF))
            .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")));
        Ok(Self {
            private_key: non_empty(lookup(ENV_PRIVATE_KEY)),
            address: non_empty(lookup(ENV_ADDRESS)),
            endpoints,
            source_url: non_empty(lookup(ENV_SOURCE_URL)),
            verify_proof,
            ..Self::default()
        })
    }

    /// Field-wise overlay: values set on `self` win over `other`
    pub fn merge(self, other: ClientConfig) -> ClientConfig {
        ClientConfig {
            private_key: self.private_key.or(other.private_key),
            address: self.address.or(other.address),
            endpoints: self.endpoints.or(other.endpoints),
            source_url: self.source_url.or(other.source_url),
            verify_proof: self.verify_proof.or(other.verify_proof),
            epoch: self.epoch.or(other.epoch),
            chain_id: self.chain_id.or(other.chain_id),
            allow_list_policy: self.allow_list_policy.or(other.allow_list_policy),
            trusted_app_hash: self.trusted_app_hash.or(other.trusted_app_hash),
            request_timeout_secs: self.request_timeout_secs.or(other.request_timeout_secs),
            fallback_endpoints: self.fallback_endpoints.or(other.fallback_endpoints),
            apply_delegation: self.apply_delegation.or(other.apply_delegation),
        }
    }

    pub fn chain_id(&self) -> &str {
        self.chain_id.as_deref().unwrap_or(DEFAULT_CHAIN_ID)
    }

    pub fn epoch(&self) -> &str {
        self.epoch.as_deref().unwrap_or(DEFAULT_EPOCH)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn discovery_trust(&self) -> DiscoveryTrust {
        match self.verify_proof {
            Some(false) => DiscoveryTrust::InsecureUnverified,
            _ => DiscoveryTrust::Verified,
        }
    }

    /// The signing key; missing or malformed is a configuration error
    pub fn private_key(&self) -> Result<PrivateKey> {
        let hex_key = self.private_key.as_deref().ok_or_else(|| {
            GonkaError::configuration(format!(
                "Private key must be provided in the configuration or through {}",
                ENV_PRIVATE_KEY
            ))
        })?;
        PrivateKey::from_hex(hex_key)
    }

    /// Configured address, or the one derived from `key` for this chain
    pub fn requester_address(&self, key: &PrivateKey) -> Result<String> {
        match &self.address {
            Some(address) => Ok(address.clone()),
            None => derive_address(key, address_prefix(self.chain_id())),
        }
    }

    pub fn trusted_app_hash(&self) -> Result<Option<Hash>> {
        self.trusted_app_hash
            .as_deref()
            .map(|hex| {
                Hash::from_hex(hex.trim()).map_err(|e| {
                    GonkaError::configuration(format!("Invalid trusted_app_hash: {}", e))
                })
            })
            .transpose()
    }

    /// Resolver inputs with `self` as the explicit layer and `environment`
    /// as the environment layer
    pub fn resolver_config(
        &self,
        environment: &ClientConfig,
        selector: EndpointSelector,
    ) -> Result<ResolverConfig> {
        let settings = self.clone().merge(environment.clone());
        let discovery = match &settings.source_url {
            Some(source_url) => Some(DiscoveryOptions {
                source_url: source_url.clone(),
                epoch: settings.epoch().to_string(),
                trust: settings.discovery_trust(),
                allow_list_policy: settings.allow_list_policy.unwrap_or_default(),
                trusted_app_hash: settings.trusted_app_hash()?,
                apply_delegation: settings.apply_delegation.unwrap_or(true),
            }),
            None => None,
        };
        Ok(ResolverConfig {
            explicit: self.endpoints.clone(),
            environment: environment.endpoints.clone(),
            discovery,
            fallback: settings.fallback_endpoints.unwrap_or_else(default_endpoints),
            selector,
        })
    }
}
