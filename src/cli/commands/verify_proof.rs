//! Verify-proof command implementation

use crate::core::types::Hash;
use crate::discovery::ParticipantsWithProof;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

/// Execute the verify-proof command
pub fn execute(payload: PathBuf, app_hash: Option<String>, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(&payload)
        .with_context(|| format!("Failed to read {}", payload.display()))?;
    let envelope: ParticipantsWithProof = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a participants payload", payload.display()))?;
    let trusted = app_hash
        .as_deref()
        .map(Hash::from_hex)
        .transpose()
        .context("Invalid --app-hash")?;

    // Nothing from an unproven payload is shown
    let result = envelope.verify(trusted.as_ref());

    if json {
        let output = match &result {
            Ok(()) => json!({
                "verified": true,
                "app_hash": envelope.app_hash().ok().map(hex::encode),
                "endpoints": envelope.endpoints(),
            }),
            Err(e) => json!({
                "verified": false,
                "error": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &result {
            Ok(()) => {
                println!("{}", "✓ Participant proof verified".green().bold());
                for endpoint in &envelope.endpoints() {
                    println!("  {} {} {}", "•".cyan(), endpoint.url, endpoint.address.dimmed());
                }
            }
            Err(e) => println!("{} {}", "✗ Proof verification failed:".red().bold(), e),
        }
    }

    result.map_err(Into::into)
}
