//! Command-line interface for gonka-auth

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Request signing and provider discovery for the Gonka network
#[derive(Parser)]
#[command(
    name = "gonka-auth",
    version,
    about = "Request signing and proof-verified provider discovery for the Gonka network",
    long_about = "Derives requester addresses, produces signed request headers, verifies participant proofs offline and resolves provider endpoints."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ~/.gonka/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Hex private key (overrides config file and GONKA_PRIVATE_KEY)
    #[arg(long, global = true, hide_env_values = true)]
    pub private_key: Option<String>,

    /// Chain id used for the address prefix
    #[arg(long, global = true)]
    pub chain_id: Option<String>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the requester address derived from the private key
    Address,

    /// Produce signed request headers for a payload
    Sign {
        /// Payload text
        #[arg(long, conflicts_with = "file")]
        payload: Option<String>,

        /// Read the payload from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Provider address the request is sent to
        #[arg(long)]
        provider: String,

        /// Timestamp in nanoseconds (default: now)
        #[arg(long)]
        timestamp: Option<u64>,
    },

    /// Verify a saved participants-with-proof payload offline
    VerifyProof {
        /// Payload JSON file
        payload: PathBuf,

        /// Require this app hash (hex)
        #[arg(long)]
        app_hash: Option<String>,
    },

    /// Resolve provider endpoints
    Resolve {
        /// Discovery source URL
        #[arg(long)]
        source_url: Option<String>,

        /// Explicit endpoints, "url;address,url;address"
        #[arg(long)]
        endpoints: Option<String>,

        /// Epoch to query
        #[arg(long)]
        epoch: Option<String>,

        /// Skip proof verification (testing only)
        #[arg(long)]
        insecure: bool,

        /// Behaviour when the allow-list cannot be fetched
        #[arg(long, value_enum)]
        allow_list_policy: Option<AllowListPolicyArg>,

        /// Do not follow delegate identity mappings
        #[arg(long)]
        no_delegation: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AllowListPolicyArg {
    DropAll,
    SkipFiltering,
}
