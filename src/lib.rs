//! gonka_auth - request signing and proof-verified provider discovery
//!
//! Requests to Gonka inference providers are authenticated with a
//! secp256k1 signature bound to the payload, a nanosecond timestamp and the
//! provider's address. Providers are discovered from a source node whose
//! participant list is proven against the chain's app hash with ICS-23
//! existence proofs before it is trusted.
//!
//! # Core Features
//!
//! - **Signing**: fixed-width low-S signatures and the headers that carry them
//! - **Proof verification**: IAVL store proof chained to a multistore proof
//! - **Discovery**: allow-list filtering, delegate redirection and fallback
//! - **Configuration**: TOML file, explicit values and an environment adapter
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use gonka_auth::{ClientConfig, ClientOptions, SignedClient};
//!
//! let environment = ClientConfig::from_env()?;
//! let client = SignedClient::connect(&ClientConfig::load()?, &environment, ClientOptions::default())?;
//! let response = client.post_json(
//!     "chat/completions",
//!     &serde_json::json!({ "model": "Qwen/QwQ-32B", "messages": [] }),
//! )?;
//! println!("{}", response.status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod client;
pub mod codec;
pub mod config;
pub mod core;
pub mod discovery;
pub mod proofs;
pub mod signing;

// Re-export commonly used types
pub use self::core::{
    error::{GonkaError, Result},
    types::{Endpoint, Hash},
};

pub use client::{ClientOptions, SignedClient};
pub use config::ClientConfig;

pub use discovery::{
    resolve_endpoints, DiscoveryTrust, EndpointSelector, Resolution, ResolutionOrigin,
    ResolverConfig,
};

pub use proofs::{verify, ProofError, ProofOp, ProofOpKind};

pub use signing::{
    build_signing_input, derive_address, sign, PrivateKey, RawSignature, SignatureComponents,
    SignaturePayload,
};

/// Current version of gonka_auth
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
