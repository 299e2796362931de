//! node type representing an overlay device.
//!
//! the access-control engine only needs a node's identity, its network and
//! the tags attached to it; transport state lives elsewhere.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::network::NetworkId;
use crate::tag::TagId;

/// unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// generate a fresh random node id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for NodeId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::InvalidId(format!("{s}: {e}")))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// an overlay device participating in a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    hostname: String,
    network: NetworkId,
    #[serde(default)]
    tags: BTreeSet<TagId>,
}

impl Node {
    /// create an untagged node in the given network.
    pub fn new(id: NodeId, hostname: impl Into<String>, network: NetworkId) -> Self {
        Self {
            id,
            hostname: hostname.into(),
            network,
            tags: BTreeSet::new(),
        }
    }

    /// builder-style: attach tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// the node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// the node's hostname.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// the network this node belongs to.
    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    /// tags attached to this node.
    pub fn tags(&self) -> &BTreeSet<TagId> {
        &self.tags
    }

    /// check whether the node carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// attach a tag; returns false if it was already present.
    pub fn add_tag(&mut self, tag: TagId) -> bool {
        self.tags.insert(tag)
    }

    /// detach a tag; returns false if it was not present.
    pub fn remove_tag(&mut self, tag: &TagId) -> bool {
        self.tags.remove(tag)
    }
}
