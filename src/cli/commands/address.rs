//! Address command implementation

use crate::config::ClientConfig;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Execute the address command
pub fn execute(config_path: Option<&Path>, flags: ClientConfig, json: bool) -> Result<()> {
    let (explicit, environment) = super::load_layers(config_path, flags)?;
    let settings = explicit.merge(environment);
    let key = settings.private_key()?;
    let address = settings.requester_address(&key)?;

    if json {
        let output = json!({
            "address": address,
            "public_key": hex::encode(key.public_key_compressed()),
            "chain_id": settings.chain_id(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", address.bright_green());
        println!(
            "  {} Public key: {}",
            "•".cyan(),
            hex::encode(key.public_key_compressed()).dimmed()
        );
        println!("  {} Chain: {}", "•".cyan(), settings.chain_id().dimmed());
    }
    Ok(())
}
