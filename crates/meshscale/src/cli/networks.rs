//! the `networks` subcommand - network lifecycle hooks

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result};
use meshscale_types::NetworkId;

use super::ConfigArgs;

/// network lifecycle events
#[derive(Subcommand, Debug)]
pub enum NetworksCommand {
    /// a network was created: install its default acls
    Create(NetworkArgs),

    /// a network was deleted: remove its default acls
    Delete(NetworkArgs),
}

/// arguments naming one network
#[derive(Args, Debug)]
pub struct NetworkArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// network id
    network: NetworkId,
}

impl NetworksCommand {
    /// run the networks command
    pub async fn run(self) -> Result<()> {
        match self {
            NetworksCommand::Create(args) => create_network(args).await,
            NetworksCommand::Delete(args) => delete_network(args).await,
        }
    }
}

async fn create_network(args: NetworkArgs) -> Result<()> {
    let engine = args.config.connect().await?;

    engine
        .on_network_created(&args.network)
        .await
        .with_context(|| format!("failed to install default acls for {}", args.network))?;

    println!("Installed default acls for network {}", args.network);
    Ok(())
}

async fn delete_network(args: NetworkArgs) -> Result<()> {
    let engine = args.config.connect().await?;

    let removed = engine
        .remove_defaults(&args.network)
        .await
        .with_context(|| format!("failed to remove default acls for {}", args.network))?;

    println!("Removed {} default acls from network {}", removed, args.network);
    Ok(())
}
