//! Signed client assembly

use crate::config::ClientConfig;
use crate::core::error::{GonkaError, Result};
use crate::core::types::Endpoint;
use crate::discovery::fetch::{HttpFetcher, JsonFetcher};
use crate::discovery::resolver::{resolve_endpoints, Resolution, ResolutionOrigin};
use crate::discovery::selection::EndpointSelector;
use crate::signing::address::validate_provider_address;
use crate::signing::transport::{
    HttpExchange, HttpResponse, OutgoingRequest, ProviderBinding, ReqwestExchange,
    SigningTransport,
};
use tracing::info;

/// A client bound to one provider endpoint whose requests are all signed
#[derive(Debug)]
pub struct SignedClient<T = ReqwestExchange> {
    endpoint: Endpoint,
    resolution: Resolution,
    transport: SigningTransport<T>,
}

/// How the target endpoint is chosen
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Skip resolution and talk to this endpoint
    pub pinned_endpoint: Option<Endpoint>,
    pub selector: EndpointSelector,
}

impl SignedClient<ReqwestExchange> {
    /// Build from explicit settings layered over the environment
    pub fn connect(
        config: &ClientConfig,
        environment: &ClientConfig,
        options: ClientOptions,
    ) -> Result<Self> {
        let settings = config.clone().merge(environment.clone());
        let fetcher = HttpFetcher::new(settings.request_timeout())?;
        let exchange = ReqwestExchange::new(settings.request_timeout())?;
        Self::with_parts(config, environment, options, &fetcher, exchange)
    }
}

impl<T: HttpExchange> SignedClient<T> {
    /// Build with caller-supplied discovery fetcher and HTTP exchange
    pub fn with_parts(
        config: &ClientConfig,
        environment: &ClientConfig,
        options: ClientOptions,
        fetcher: &dyn JsonFetcher,
        exchange: T,
    ) -> Result<Self> {
        let settings = config.clone().merge(environment.clone());
        let key = settings.private_key()?;
        let requester_address = settings.requester_address(&key)?;

        let (endpoint, resolution) = match options.pinned_endpoint {
            Some(endpoint) => {
                let resolution = Resolution {
                    endpoints: vec![endpoint.clone()],
                    origin: ResolutionOrigin::Explicit,
                };
                (endpoint, resolution)
            }
            None => {
                let resolver = config.resolver_config(environment, options.selector.clone())?;
                let resolution = resolve_endpoints(fetcher, &resolver)?;
                let endpoint = options.selector.select(&resolution.endpoints)?;
                (endpoint, resolution)
            }
        };
        validate_provider_address(&endpoint)?;
        info!(
            "Using endpoint {} from {} resolution as {}",
            endpoint, resolution.origin, requester_address
        );

        let transport = SigningTransport::new(
            exchange,
            key,
            requester_address,
            ProviderBinding::Fixed(endpoint.address.clone()),
        );
        Ok(Self {
            endpoint,
            resolution,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn requester_address(&self) -> &str {
        self.transport.requester_address()
    }

    /// `endpoint.url` joined with `path`
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send any request through the signing transport
    pub fn execute(&self, request: OutgoingRequest) -> Result<HttpResponse> {
        self.transport.execute(request)
    }

    /// POST a JSON body to `path` relative to the endpoint
    pub fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpResponse> {
        let request = OutgoingRequest::new("POST", self.url_for(path))
            .with_header("Content-Type", "application/json")
            .with_body(serde_json::to_vec(body)?);
        let response = self.execute(request)?;
        if !response.is_success() {
            return Err(GonkaError::ServerStatus {
                url: self.url_for(path),
                status: response.status,
            });
        }
        Ok(response)
    }
}
