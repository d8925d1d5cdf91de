//! Resolve command implementation

use crate::config::ClientConfig;
use crate::discovery::{parse_endpoint_list, resolve_endpoints, EndpointSelector, HttpFetcher};
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Execute the resolve command
pub fn execute(
    config_path: Option<&Path>,
    mut flags: ClientConfig,
    endpoints: Option<String>,
    json: bool,
) -> Result<()> {
    if let Some(list) = endpoints {
        flags.endpoints = Some(parse_endpoint_list(&list)?);
    }
    let (explicit, environment) = super::load_layers(config_path, flags)?;
    let resolver = explicit.resolver_config(&environment, EndpointSelector::Random)?;
    let settings = explicit.merge(environment);
    let fetcher = HttpFetcher::new(settings.request_timeout())?;
    let resolution = resolve_endpoints(&fetcher, &resolver)?;

    if json {
        let output = json!({
            "origin": resolution.origin,
            "endpoints": resolution.endpoints,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{} {} endpoint(s) from {}",
            "Resolved".green().bold(),
            resolution.endpoints.len(),
            resolution.origin.to_string().bold()
        );
        for endpoint in &resolution.endpoints {
            println!("  {} {} {}", "•".cyan(), endpoint.url, endpoint.address.dimmed());
        }
    }
    Ok(())
}
