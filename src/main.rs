//! gonka-auth CLI
//!
//! Command-line interface for request signing and provider discovery.

use anyhow::Result;
use clap::Parser;
use gonka_auth::cli::{commands, AllowListPolicyArg, Cli, Commands};
use gonka_auth::config::ClientConfig;
use gonka_auth::discovery::AllowListPolicy;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging on stderr so JSON output stays clean
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let flags = ClientConfig {
        private_key: cli.private_key,
        chain_id: cli.chain_id,
        ..ClientConfig::default()
    };
    let config_path = cli.config.as_deref();

    // Execute the command
    match cli.command {
        Commands::Address => commands::address::execute(config_path, flags, cli.json),
        Commands::Sign {
            payload,
            file,
            provider,
            timestamp,
        } => commands::sign::execute(
            config_path,
            flags,
            payload,
            file,
            provider,
            timestamp,
            cli.json,
        ),
        Commands::VerifyProof { payload, app_hash } => {
            commands::verify_proof::execute(payload, app_hash, cli.json)
        }
        Commands::Resolve {
            source_url,
            endpoints,
            epoch,
            insecure,
            allow_list_policy,
            no_delegation,
        } => {
            let flags = ClientConfig {
                source_url,
                epoch,
                verify_proof: insecure.then_some(false),
                allow_list_policy: allow_list_policy.map(|policy| match policy {
                    AllowListPolicyArg::DropAll => AllowListPolicy::DropAll,
                    AllowListPolicyArg::SkipFiltering => AllowListPolicy::SkipFiltering,
                }),
                apply_delegation: no_delegation.then_some(false),
                ..flags
            };
            commands::resolve::execute(config_path, flags, endpoints, cli.json)
        }
    }
}
