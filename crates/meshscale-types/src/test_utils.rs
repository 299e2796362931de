//! test utilities for creating test nodes and users.
//!
//! this module provides builder patterns for creating test instances
//! of meshscale types without needing to specify all fields.

use crate::{NetworkId, Node, NodeId, TagId, User};

/// builder for creating test [`Node`] instances.
///
/// # example
/// ```
/// use meshscale_types::test_utils::TestNodeBuilder;
///
/// let node = TestNodeBuilder::new("skynet").build();
/// let tagged = TestNodeBuilder::new("skynet").with_tags(&["tagA"]).build();
/// assert!(tagged.has_tag("tagA"));
/// ```
#[derive(Debug, Clone)]
pub struct TestNodeBuilder {
    network: String,
    tags: Vec<String>,
}

impl TestNodeBuilder {
    /// create a new builder for a node in the given network.
    pub fn new(network: &str) -> Self {
        Self {
            network: network.to_string(),
            tags: vec![],
        }
    }

    /// set tags for the node.
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// build the node.
    ///
    /// # Panics
    /// panics if the network or a tag is invalid.
    pub fn build(self) -> Node {
        let id = NodeId::generate();
        let hostname = format!("node-{id}");
        let network = NetworkId::new(self.network).expect("invalid test network id");
        let tags = self
            .tags
            .into_iter()
            .map(|t| TagId::new(t).expect("invalid test tag"));
        Node::new(id, hostname, network).with_tags(tags)
    }
}

/// create a test user with the given group memberships.
pub fn test_user(username: &str, groups: &[&str]) -> User {
    User::new(username).with_groups(groups.iter().copied())
}
