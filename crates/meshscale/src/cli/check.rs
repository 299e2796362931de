//! the `check` subcommand - evaluate the authorizer for two nodes

use clap::Args;
use color_eyre::eyre::Result;
use meshscale_types::{NetworkId, Node, NodeId, TagId};

use super::ConfigArgs;

/// check whether a node may communicate with a peer
///
/// prints `allowed` or `denied`; the exit status is non-zero when denied.
#[derive(Args, Debug)]
pub struct CheckCommand {
    #[command(flatten)]
    config: ConfigArgs,

    /// network of the initiating node
    #[arg(long)]
    node_network: NetworkId,

    /// tags of the initiating node
    #[arg(long, value_delimiter = ',')]
    node_tags: Vec<TagId>,

    /// network of the peer (defaults to the node's network)
    #[arg(long)]
    peer_network: Option<NetworkId>,

    /// tags of the peer
    #[arg(long, value_delimiter = ',')]
    peer_tags: Vec<TagId>,
}

impl CheckCommand {
    /// run the check command, returning the decision.
    pub async fn run(self) -> Result<bool> {
        let engine = self.config.connect().await?;

        let peer_network = self
            .peer_network
            .unwrap_or_else(|| self.node_network.clone());
        let node = Node::new(NodeId::generate(), "node", self.node_network).with_tags(self.node_tags);
        let peer = Node::new(NodeId::generate(), "peer", peer_network).with_tags(self.peer_tags);

        let allowed = engine.is_allowed(&node, &peer).await;
        println!("{}", if allowed { "allowed" } else { "denied" });
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command};
    use clap::Parser;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "meshscale",
            "check",
            "--node-network",
            "skynet",
            "--node-tags",
            "tagA,tagC",
            "--peer-tags",
            "tagB",
        ])
        .unwrap();

        let Command::Check(cmd) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(cmd.node_network.as_str(), "skynet");
        assert_eq!(cmd.node_tags.len(), 2);
        assert!(cmd.peer_network.is_none());
        assert_eq!(cmd.peer_tags[0].as_str(), "tagB");
    }

    #[test]
    fn test_parse_check_rejects_wildcard_tag() {
        let result = Cli::try_parse_from([
            "meshscale",
            "check",
            "--node-network",
            "skynet",
            "--node-tags",
            "*",
        ]);
        assert!(result.is_err());
    }
}
