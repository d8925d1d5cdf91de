//! HTTP collaborators for discovery

use crate::core::error::{GonkaError, Result};
use crate::discovery::endpoint::base_url;
use crate::discovery::payload::ParticipantsWithProof;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Anything that can GET a URL and return its JSON body.
///
/// Non-success statuses and transport failures are errors; the resolver
/// decides what a failure means.
#[cfg_attr(test, mockall::automock)]
pub trait JsonFetcher {
    fn get_json(&self, url: &str) -> Result<serde_json::Value>;
}

/// Blocking reqwest implementation
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("gonka-auth/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GonkaError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl JsonFetcher for HttpFetcher {
    fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .map_err(|e| GonkaError::network(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(GonkaError::ServerStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .map_err(|e| GonkaError::network(format!("Failed to parse response from {}: {}", url, e)))
    }
}

/// Identity published by a node at `/v1/identity`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub warm_key_address: Option<String>,
    /// Delegate address to serving URL
    #[serde(default)]
    pub delegate_ta: Option<BTreeMap<String, String>>,
}

impl NodeIdentity {
    pub fn delegates(&self) -> impl Iterator<Item = (&String, &String)> {
        self.delegate_ta.iter().flatten()
    }

    pub fn has_delegates(&self) -> bool {
        self.delegates().next().is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChainParamsResponse {
    #[serde(default)]
    params: Option<ChainParams>,
}

#[derive(Debug, Default, Deserialize)]
struct ChainParams {
    #[serde(default)]
    transfer_agent_access_params: Option<TransferAgentAccessParams>,
}

#[derive(Debug, Default, Deserialize)]
struct TransferAgentAccessParams {
    #[serde(default)]
    allowed_transfer_addresses: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct IdentityResponse {
    #[serde(default)]
    data: Option<NodeIdentity>,
}

pub fn participants_url(source_url: &str, epoch: &str) -> Result<String> {
    if epoch.is_empty() {
        return Err(GonkaError::InvalidEpoch);
    }
    Ok(format!("{}/v1/epochs/{}/participants", base_url(source_url), epoch))
}

pub fn allow_list_url(node_url: &str) -> String {
    format!(
        "{}/chain-api/productscience/inference/inference/params",
        base_url(node_url)
    )
}

pub fn identity_url(node_url: &str) -> String {
    format!("{}/v1/identity", base_url(node_url))
}

fn get_as<T: DeserializeOwned>(fetcher: &dyn JsonFetcher, url: &str) -> Result<T> {
    let value = fetcher.get_json(url)?;
    serde_json::from_value(value)
        .map_err(|e| GonkaError::invalid_payload(format!("unexpected response from {}: {}", url, e)))
}

pub fn fetch_participants_with_proof(
    fetcher: &dyn JsonFetcher,
    source_url: &str,
    epoch: &str,
) -> Result<ParticipantsWithProof> {
    let url = participants_url(source_url, epoch)?;
    get_as(fetcher, &url)
}

/// Provider addresses currently allowed to act as transfer agents
pub fn fetch_allowed_transfer_addresses(
    fetcher: &dyn JsonFetcher,
    node_url: &str,
) -> Result<Vec<String>> {
    let response: ChainParamsResponse = get_as(fetcher, &allow_list_url(node_url))?;
    Ok(response
        .params
        .and_then(|p| p.transfer_agent_access_params)
        .and_then(|p| p.allowed_transfer_addresses)
        .unwrap_or_default())
}

pub fn fetch_node_identity(fetcher: &dyn JsonFetcher, node_url: &str) -> Result<NodeIdentity> {
    let response: IdentityResponse = get_as(fetcher, &identity_url(node_url))?;
    Ok(response.data.unwrap_or_default())
}
