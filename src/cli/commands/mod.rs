//! CLI command implementations

pub mod address;
pub mod resolve;
pub mod sign;
pub mod verify_proof;

use crate::config::ClientConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration layers for a command: flags over the config file as the
/// explicit layer, and the process environment as the environment layer
pub fn load_layers(
    config_path: Option<&Path>,
    flags: ClientConfig,
) -> Result<(ClientConfig, ClientConfig)> {
    let file = match config_path {
        Some(path) => ClientConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::load()?,
    };
    let environment = ClientConfig::from_env()?;
    Ok((flags.merge(file), environment))
}
