//! the communication decision consulted before forwarding traffic.
//!
//! authorization always yields a boolean. lookup failures only disable the
//! step they occur in; traffic is denied when no step authorizes it.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use meshscale_db::KvStore;
use meshscale_types::{DirectionMode, NetworkScope, Node, TagId};

use crate::error::Error;
use crate::manager::AclManager;
use crate::model::{Acl, AclPolicyType, TrafficDirection};
use crate::resolver::IdentityResolver;

impl<D, R> AclManager<D, R>
where
    D: KvStore,
    R: IdentityResolver,
{
    /// decide whether `node` may communicate with `peer`.
    pub async fn is_allowed(&self, node: &Node, peer: &Node) -> bool {
        if self.config.network_scope == NetworkScope::SharedNetwork
            && node.network() != peer.network()
        {
            warn!(
                node = %node.id(),
                peer = %peer.id(),
                node_network = %node.network(),
                peer_network = %peer.network(),
                "denying communication across networks"
            );
            return false;
        }

        match self
            .get_default_policy(node.network(), AclPolicyType::DevicePolicy)
            .await
        {
            Ok(default) if default.enabled => return true,
            Ok(_) => {}
            Err(Error::NotFound(_)) => {
                debug!(network = %node.network(), "no default device policy");
            }
            Err(e) => {
                warn!(network = %node.network(), error = %e, "default device policy lookup failed");
            }
        }

        let network = match self.config.network_scope {
            NetworkScope::PeerNetwork => peer.network(),
            NetworkScope::SharedNetwork => node.network(),
        };

        let policies = match self.list_device_policies(network).await {
            Ok(policies) => policies,
            Err(e) => {
                warn!(network = %network, error = %e, "device policy lookup failed");
                return false;
            }
        };

        let node_tags = self.resolver.tags_of(node);
        let peer_tags = self.resolver.tags_of(peer);

        let matched = policies
            .iter()
            .filter(|acl| self.config.include_disabled || acl.enabled)
            .find(|acl| tags_match(acl, &node_tags, &peer_tags, self.config.direction));

        match matched {
            Some(acl) => {
                debug!(node = %node.id(), peer = %peer.id(), acl = %acl.id, "communication allowed");
                true
            }
            None => {
                debug!(node = %node.id(), peer = %peer.id(), "no acl allows communication");
                false
            }
        }
    }

    /// the subset of `peers` that `node` may communicate with.
    pub async fn allowed_peers<'a>(&self, node: &Node, peers: &'a [Node]) -> Vec<&'a Node> {
        let mut allowed = Vec::with_capacity(peers.len());
        for peer in peers {
            if peer.id() != node.id() && self.is_allowed(node, peer).await {
                allowed.push(peer);
            }
        }
        allowed
    }
}

/// match tags by identifier only; the tag kind is not consulted.
///
/// a wildcard value is a literal here: it never equals a node tag, so
/// allow-all behaviour comes only from the enabled default policy.
fn tags_match(
    acl: &Acl,
    node_tags: &BTreeSet<TagId>,
    peer_tags: &BTreeSet<TagId>,
    direction: DirectionMode,
) -> bool {
    let src: HashSet<&str> = acl.src.iter().map(|t| t.value.as_str()).collect();
    let dst: HashSet<&str> = acl.dst.iter().map(|t| t.value.as_str()).collect();

    let forward = any_in(node_tags, &src) && any_in(peer_tags, &dst);
    let reverse = any_in(peer_tags, &src) && any_in(node_tags, &dst);

    match direction {
        DirectionMode::Symmetric => forward || reverse,
        DirectionMode::Enforced => {
            forward || (acl.allowed_direction == TrafficDirection::Bidirectional && reverse)
        }
    }
}

fn any_in(tags: &BTreeSet<TagId>, set: &HashSet<&str>) -> bool {
    tags.iter().any(|t| set.contains(t.as_str()))
}
