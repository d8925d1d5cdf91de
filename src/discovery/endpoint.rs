//! Endpoint URL normalisation and endpoint list parsing

use crate::core::constants::API_VERSION_SEGMENT;
use crate::core::error::{GonkaError, Result};
use crate::core::types::Endpoint;

/// Canonical service URL: no trailing slash, ending in `/v1`.
/// `/v1` is only ever appended, never collapsed, so an input already ending
/// in `/v1/v1` keeps both segments. An empty URL stays empty.
pub fn normalize_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with(API_VERSION_SEGMENT) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_VERSION_SEGMENT}")
    }
}

/// Node root URL: trailing slashes and a trailing `/v1` removed
pub fn base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed
        .strip_suffix(API_VERSION_SEGMENT)
        .unwrap_or(trimmed)
        .to_string()
}

/// Parse `url;address,url;address`. Blank entries are ignored; any other
/// entry must have exactly two non-empty parts.
pub fn parse_endpoint_list(list: &str) -> Result<Vec<Endpoint>> {
    let mut endpoints = Vec::new();
    for entry in list.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let parts: Vec<&str> = entry.split(';').map(str::trim).collect();
        match parts.as_slice() {
            [url, address] if !url.is_empty() && !address.is_empty() => {
                endpoints.push(Endpoint::new(*url, *address));
            }
            _ => return Err(GonkaError::invalid_endpoint(entry)),
        }
    }
    Ok(endpoints)
}
