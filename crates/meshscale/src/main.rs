//! meshscale - access-control engine for mesh overlay networks

use clap::Parser;
use color_eyre::eyre::Result;
use meshscale::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Networks(cmd) => cmd.run().await,
        Command::Acls(cmd) => cmd.run().await,
        Command::Check(cmd) => {
            if !cmd.run().await? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
