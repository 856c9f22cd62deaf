//! CLI argument definitions using clap
//!
//! Commands:
//! - docregistry init --config <path>
//! - docregistry exec --config <path>
//! - docregistry batch --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docregistry - document registry with an append-only audit trail
#[derive(Parser, Debug)]
#[command(name = "docregistry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty ledger snapshot
    Init {
        /// Path to configuration file
        #[arg(long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Execute one JSON request read from stdin
    Exec {
        /// Path to configuration file
        #[arg(long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Execute one request per stdin line until EOF
    Batch {
        /// Path to configuration file
        #[arg(long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
