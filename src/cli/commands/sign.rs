//! Sign command implementation

use crate::config::ClientConfig;
use crate::signing::{
    sign, timestamp_nanos, SignatureComponents, SignaturePayload, HEADER_AUTHORIZATION,
    HEADER_REQUESTER_ADDRESS, HEADER_TIMESTAMP,
};
use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the sign command
pub fn execute(
    config_path: Option<&Path>,
    flags: ClientConfig,
    payload: Option<String>,
    file: Option<PathBuf>,
    provider: String,
    timestamp: Option<u64>,
    json: bool,
) -> Result<()> {
    let (explicit, environment) = super::load_layers(config_path, flags)?;
    let settings = explicit.merge(environment);
    let key = settings.private_key()?;
    let requester = settings.requester_address(&key)?;

    let payload = match (payload, file) {
        (Some(text), _) => SignaturePayload::Text(text),
        (None, Some(path)) => SignaturePayload::Bytes(std::fs::read(&path)?),
        (None, None) => SignaturePayload::empty(),
    };
    let timestamp = timestamp.unwrap_or_else(timestamp_nanos);
    let components = SignatureComponents::new(payload, timestamp, provider);
    let signature = sign(&components, &key)?;

    if json {
        let mut headers = serde_json::Map::new();
        headers.insert(HEADER_AUTHORIZATION.to_string(), signature.to_base64().into());
        headers.insert(HEADER_REQUESTER_ADDRESS.to_string(), requester.into());
        headers.insert(HEADER_TIMESTAMP.to_string(), timestamp.to_string().into());
        println!("{}", serde_json::to_string_pretty(&headers)?);
    } else {
        println!("{}: {}", HEADER_AUTHORIZATION.bold(), signature.to_base64());
        println!("{}: {}", HEADER_REQUESTER_ADDRESS.bold(), requester);
        println!("{}: {}", HEADER_TIMESTAMP.bold(), timestamp);
    }
    Ok(())
}
