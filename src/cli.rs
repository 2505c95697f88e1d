//! Command-line interface definition for VaultDesk
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the serve command and configuration override flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VaultDesk - personal dashboard backend
///
/// Serves the markdown vault index, conversation persistence, and
/// workflow dispatch behind a single-user session gate.
#[derive(Parser, Debug, Clone)]
#[command(name = "vaultdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the vault root directory
    #[arg(long, env = "VAULTDESK_VAULT_ROOT")]
    pub vault_root: Option<PathBuf>,

    /// Override the conversation database path
    #[arg(long, env = "VAULTDESK_DB")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for VaultDesk
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the listen port from config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Build the vault link graph and print it as JSON
    Graph,

    /// Check configuration and exit
    Check,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
