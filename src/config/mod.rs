//! Client configuration
//!
//! Settings live in `~/.gonka/config.toml` or are passed in directly. The
//! environment is read only through [`ClientConfig::from_env`], and explicit
//! values always override it.

pub mod client_config;

// Re-export commonly used items
pub use client_config::ClientConfig;
