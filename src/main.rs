//! VaultDesk - personal dashboard backend
//!
//! Main entry point for the VaultDesk server.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vaultdesk::cli::{Cli, Commands};
use vaultdesk::config::Config;
use vaultdesk::vault::{build_graph, VaultReader};
use vaultdesk::server;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();

    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let mut config = Config::load(config_path, &cli)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(p) = port {
                config.server.port = p;
            }
            config.validate()?;
            tracing::info!(
                vault = %config.vault.root.display(),
                "starting VaultDesk server"
            );
            server::serve(config).await?;
            Ok(())
        }
        Commands::Graph => {
            // Graph building needs neither the signing key nor the database
            let reader = VaultReader::new(config.vault.root.clone());
            let graph = build_graph(&reader)?;
            println!("{}", serde_json::to_string_pretty(&graph)?);
            Ok(())
        }
        Commands::Check => {
            config.validate()?;
            println!("configuration OK");
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vaultdesk=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
