//! Signing middleware around an HTTP exchange

use crate::core::error::{GonkaError, Result};
use crate::core::types::Endpoint;
use crate::signing::address::validate_provider_address;
use crate::signing::clock::timestamp_nanos;
use crate::signing::key::PrivateKey;
use crate::signing::message::{SignatureComponents, SignaturePayload};
use crate::signing::signature::sign;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_REQUESTER_ADDRESS: &str = "X-Requester-Address";
pub const HEADER_TIMESTAMP: &str = "X-Timestamp";

/// A request before it is handed to the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl OutgoingRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Replace any existing header of the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Anything that can perform an HTTP exchange
pub trait HttpExchange {
    fn execute(&self, request: OutgoingRequest) -> Result<HttpResponse>;
}

/// Blocking reqwest exchange
#[derive(Debug, Clone)]
pub struct ReqwestExchange {
    client: reqwest::blocking::Client,
}

impl ReqwestExchange {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("gonka-auth/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GonkaError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpExchange for ReqwestExchange {
    fn execute(&self, request: OutgoingRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| GonkaError::network(format!("Invalid method {}: {}", request.method, e)))?;
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder
            .send()
            .map_err(|e| GonkaError::network(format!("Request to {} failed: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = response.bytes()?.to_vec();
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Which provider address a request's signature is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderBinding {
    /// Every request goes to one provider
    Fixed(String),
    /// The endpoint serving the request's origin, preferring the longest
    /// matching base path when several share it
    ByEndpoint(Vec<Endpoint>),
}

impl ProviderBinding {
    /// Provider address for `url`, checked to be a real account address
    pub fn provider_for(&self, url: &str) -> Result<String> {
        let endpoint = match self {
            Self::Fixed(address) => Endpoint::new(url, address.clone()),
            Self::ByEndpoint(endpoints) => {
                let target = Url::parse(url).map_err(|_| GonkaError::NoProviderForUrl {
                    url: url.to_string(),
                })?;
                serving_endpoint(endpoints, &target)
                    .cloned()
                    .ok_or_else(|| GonkaError::NoProviderForUrl {
                        url: target.origin().ascii_serialization(),
                    })?
            }
        };
        validate_provider_address(&endpoint)?;
        Ok(endpoint.address)
    }
}

fn serving_endpoint<'a>(endpoints: &'a [Endpoint], target: &Url) -> Option<&'a Endpoint> {
    let mut best: Option<(&Endpoint, usize)> = None;
    for endpoint in endpoints {
        let Ok(base) = Url::parse(&endpoint.url) else {
            continue;
        };
        if base.origin() != target.origin() {
            continue;
        }
        let matched = base_path_match(base.path(), target.path());
        if best.map_or(true, |(_, len)| matched > len) {
            best = Some((endpoint, matched));
        }
    }
    best.map(|(endpoint, _)| endpoint)
}

/// Length of `base` when it is a whole-segment prefix of `path`, else 0
fn base_path_match(base: &str, path: &str) -> usize {
    let base = base.trim_end_matches('/');
    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => base.len(),
        _ => 0,
    }
}

/// Decorator that signs every request before delegating to `inner`
#[derive(Debug, Clone)]
pub struct SigningTransport<T> {
    inner: T,
    key: PrivateKey,
    requester_address: String,
    provider: ProviderBinding,
}

impl<T: HttpExchange> SigningTransport<T> {
    pub fn new(
        inner: T,
        key: PrivateKey,
        requester_address: impl Into<String>,
        provider: ProviderBinding,
    ) -> Self {
        Self {
            inner,
            key,
            requester_address: requester_address.into(),
            provider,
        }
    }

    pub fn requester_address(&self) -> &str {
        &self.requester_address
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Add `X-Requester-Address` (unless already set), `X-Timestamp` and
    /// `Authorization`. A request without a body is signed as an empty payload.
    pub fn sign_request(&self, request: &mut OutgoingRequest) -> Result<()> {
        let provider_address = self.provider.provider_for(&request.url)?;
        let timestamp = timestamp_nanos();
        let payload = request
            .body
            .clone()
            .map(SignaturePayload::Bytes)
            .unwrap_or_else(SignaturePayload::empty);
        let components = SignatureComponents::new(payload, timestamp, provider_address);
        let signature = sign(&components, &self.key)?;

        if request.header(HEADER_REQUESTER_ADDRESS).is_none() {
            request.set_header(HEADER_REQUESTER_ADDRESS, self.requester_address.clone());
        }
        request.set_header(HEADER_TIMESTAMP, timestamp.to_string());
        request.set_header(HEADER_AUTHORIZATION, signature.to_base64());
        debug!(
            "Signed {} {} for provider {}",
            request.method, request.url, components.provider_address
        );
        Ok(())
    }
}

impl<T: HttpExchange> HttpExchange for SigningTransport<T> {
    fn execute(&self, mut request: OutgoingRequest) -> Result<HttpResponse> {
        self.sign_request(&mut request)?;
        self.inner.execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::signature::{verify, RawSignature};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingExchange {
        seen: Mutex<Vec<OutgoingRequest>>,
    }

    impl HttpExchange for RecordingExchange {
        fn execute(&self, request: OutgoingRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"{}".to_vec(),
            })
        }
    }

    const PROVIDER: &str = "gonka1qyqszqgpqyqszqgpqyqszqgpqyqszqgpzxxq27";
    const NODE_A: &str = "gonka1qgpqyqszqgpqyqszqgpqyqszqgpqyqsznzq9pg";
    const NODE_B: &str = "gonka1qvpsxqcrqvpsxqcrqvpsxqcrqvpsxqcrjjpytf";
    const NODE_C: &str = "gonka1qszqgpqyqszqgpqyqszqgpqyqszqgpqyjzxpv4";

    fn key() -> PrivateKey {
        PrivateKey::from_hex("0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
            .unwrap()
    }

    #[test]
    fn test_headers_are_injected_and_verify() {
        let transport = SigningTransport::new(
            RecordingExchange::default(),
            key(),
            "gonka1requester",
            ProviderBinding::Fixed(PROVIDER.to_string()),
        );
        let request = OutgoingRequest::new("POST", "http://node:8000/v1/chat/completions")
            .with_body(br#"{"model":"m"}"#.to_vec());
        transport.execute(request).unwrap();

        let seen = transport.inner().seen.lock().unwrap();
        let sent = &seen[0];
        assert_eq!(sent.header("x-requester-address"), Some("gonka1requester"));
        let timestamp: u64 = sent.header(HEADER_TIMESTAMP).unwrap().parse().unwrap();
        let signature = RawSignature::from_base64(sent.header(HEADER_AUTHORIZATION).unwrap()).unwrap();
        assert!(signature.is_low_s());
        let components =
            SignatureComponents::new(br#"{"model":"m"}"#.to_vec(), timestamp, PROVIDER);
        assert!(verify(&components, &signature, &key().verifying_key()));
    }

    #[test]
    fn test_existing_requester_header_kept() {
        let transport = SigningTransport::new(
            RecordingExchange::default(),
            key(),
            "gonka1requester",
            ProviderBinding::Fixed(PROVIDER.to_string()),
        );
        let mut request =
            OutgoingRequest::new("GET", "http://node/v1/models").with_header("X-Requester-Address", "gonka1other");
        transport.sign_request(&mut request).unwrap();
        assert_eq!(request.header(HEADER_REQUESTER_ADDRESS), Some("gonka1other"));
        assert_eq!(
            request
                .headers
                .iter()
                .filter(|(k, _)| k.eq_ignore_ascii_case(HEADER_REQUESTER_ADDRESS))
                .count(),
            1
        );
    }

    #[test]
    fn test_missing_body_signed_as_empty() {
        let transport = SigningTransport::new(
            RecordingExchange::default(),
            key(),
            "gonka1requester",
            ProviderBinding::Fixed(PROVIDER.to_string()),
        );
        let mut request = OutgoingRequest::new("GET", "http://node/v1/models");
        transport.sign_request(&mut request).unwrap();
        let timestamp: u64 = request.header(HEADER_TIMESTAMP).unwrap().parse().unwrap();
        let signature =
            RawSignature::from_base64(request.header(HEADER_AUTHORIZATION).unwrap()).unwrap();
        let components = SignatureComponents::new(SignaturePayload::empty(), timestamp, PROVIDER);
        assert!(verify(&components, &signature, &key().verifying_key()));
    }

    #[test]
    fn test_provider_by_endpoint_origin() {
        let binding = ProviderBinding::ByEndpoint(vec![
            Endpoint::new("http://a.example:8000/v1", NODE_A),
            Endpoint::new("https://b.example/v1", NODE_B),
        ]);
        assert_eq!(binding.provider_for("https://b.example/v1/chat").unwrap(), NODE_B);
        assert_eq!(binding.provider_for("http://a.example:8000/v1/x").unwrap(), NODE_A);
        assert!(matches!(
            binding.provider_for("http://c.example/v1"),
            Err(GonkaError::NoProviderForUrl { .. })
        ));
    }

    #[test]
    fn test_port_must_match_exactly() {
        let binding = ProviderBinding::ByEndpoint(vec![
            Endpoint::new("http://node.example:8000/v1", NODE_A),
            Endpoint::new("http://node.example:800/v1", NODE_B),
        ]);
        assert_eq!(binding.provider_for("http://node.example:800/v1/chat").unwrap(), NODE_B);
        assert_eq!(binding.provider_for("http://node.example:8000/v1/chat").unwrap(), NODE_A);
        assert!(matches!(
            binding.provider_for("http://node.example/v1/chat"),
            Err(GonkaError::NoProviderForUrl { .. })
        ));
    }

    #[test]
    fn test_lookalike_host_is_not_bound() {
        let binding = ProviderBinding::ByEndpoint(vec![Endpoint::new(
            "http://node.example.attacker.io/v1",
            NODE_C,
        )]);
        assert!(matches!(
            binding.provider_for("http://node.example/v1/chat"),
            Err(GonkaError::NoProviderForUrl { .. })
        ));
        let binding = ProviderBinding::ByEndpoint(vec![Endpoint::new("https://node.example/v1", NODE_C)]);
        assert!(binding.provider_for("http://node.example/v1/chat").is_err());
    }

    #[test]
    fn test_longest_base_path_wins_on_shared_origin() {
        let binding = ProviderBinding::ByEndpoint(vec![
            Endpoint::new("http://gateway.example/", NODE_A),
            Endpoint::new("http://gateway.example/node-b/v1", NODE_B),
            Endpoint::new("http://gateway.example/node-b/v10", NODE_C),
        ]);
        assert_eq!(
            binding.provider_for("http://gateway.example/node-b/v1/chat").unwrap(),
            NODE_B
        );
        assert_eq!(
            binding.provider_for("http://gateway.example/node-b/v10").unwrap(),
            NODE_C
        );
        assert_eq!(binding.provider_for("http://gateway.example/other").unwrap(), NODE_A);
    }

    #[rstest]
    #[case("")]
    #[case("transfer_address_1")]
    #[case("gonka1provider")]
    fn test_non_address_provider_is_not_signed(#[case] provider: &str) {
        let transport = SigningTransport::new(
            RecordingExchange::default(),
            key(),
            "gonka1requester",
            ProviderBinding::ByEndpoint(vec![Endpoint::new("https://node.example/v1", provider)]),
        );
        let mut request = OutgoingRequest::new("POST", "https://node.example/v1/chat").with_body(b"{}".to_vec());
        let err = transport.sign_request(&mut request).unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(request.header(HEADER_AUTHORIZATION), None);

        let fixed = SigningTransport::new(
            RecordingExchange::default(),
            key(),
            "gonka1requester",
            ProviderBinding::Fixed(provider.to_string()),
        );
        assert!(fixed
            .execute(OutgoingRequest::new("GET", "https://node.example/v1/models"))
            .is_err());
        assert!(fixed.inner().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unmatched_url_is_not_sent() {
        let transport = SigningTransport::new(
            RecordingExchange::default(),
            key(),
            "gonka1requester",
            ProviderBinding::ByEndpoint(vec![Endpoint::new("http://a/v1", NODE_A)]),
        );
        let result = transport.execute(OutgoingRequest::new("GET", "http://elsewhere/v1"));
        assert!(result.is_err());
        assert!(transport.inner().seen.lock().unwrap().is_empty());
    }
}
