//! cli subcommands for meshscale.
//!
//! - `meshscale networks create <network>` - install a network's default acls
//! - `meshscale acls list --network <network>` - list a network's acls
//! - `meshscale check ...` - ask whether two nodes may communicate
//! - etc.

mod acls;
mod check;
mod config;
mod networks;

pub use acls::AclsCommand;
pub use check::CheckCommand;
pub use config::{ConfigArgs, parse_database_url};
pub use networks::NetworksCommand;

use clap::{Parser, Subcommand};

/// meshscale - access-control engine for mesh overlay networks
#[derive(Parser, Debug)]
#[command(name = "meshscale")]
#[command(about = "Access-control engine for mesh overlay networks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// the subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// network lifecycle events
    #[command(subcommand)]
    Networks(NetworksCommand),

    /// manage acls
    #[command(subcommand)]
    Acls(AclsCommand),

    /// check whether a node may communicate with a peer
    Check(CheckCommand),
}
