//! implicit allow-all policies installed with each network.

use tracing::{debug, info};

use meshscale_db::KvStore;
use meshscale_types::NetworkId;

use crate::error::{Error, Result};
use crate::manager::AclManager;
use crate::model::{Acl, AclPolicyType, TrafficDirection};
use crate::resolver::IdentityResolver;
use crate::tag::{AclPolicyTag, AclTagKind};

/// name of the default device policy.
pub const ALL_NODES: &str = "all-nodes";

/// name of the default user policy.
pub const ALL_USERS: &str = "all-users";

/// creator recorded on system-created policies.
pub const AUTO_CREATOR: &str = "auto";

/// the default device policy: every device may reach every device.
pub fn default_device_policy(network: &NetworkId) -> Acl {
    let mut acl = Acl::new(network.clone(), ALL_NODES, AclPolicyType::DevicePolicy)
        .with_src([AclPolicyTag::wildcard(AclTagKind::Device)])
        .with_dst([AclPolicyTag::wildcard(AclTagKind::Device)])
        .with_direction(TrafficDirection::Bidirectional)
        .with_creator(AUTO_CREATOR);
    acl.default = true;
    acl
}

/// the default user policy: every user and group may reach every device.
pub fn default_user_policy(network: &NetworkId) -> Acl {
    let mut acl = Acl::new(network.clone(), ALL_USERS, AclPolicyType::UserPolicy)
        .with_src([
            AclPolicyTag::wildcard(AclTagKind::User),
            AclPolicyTag::wildcard(AclTagKind::UserGroup),
        ])
        .with_dst([AclPolicyTag::wildcard(AclTagKind::Device)])
        .with_direction(TrafficDirection::Unidirectional)
        .with_creator(AUTO_CREATOR);
    acl.default = true;
    acl
}

impl<D, R> AclManager<D, R>
where
    D: KvStore,
    R: IdentityResolver,
{
    /// install the default device and user policies for a network.
    ///
    /// a rule type that already has a default is left alone, so replaying
    /// this never produces a second default.
    ///
    /// the lookup and the insert are separate store calls. concurrent calls
    /// for one network race like any other write and can each insert a
    /// default; [`Self::get_default_policy`] then returns the first one
    /// scanned and [`Self::remove_defaults`] removes all of them.
    pub async fn create_defaults(&self, network: &NetworkId) -> Result<()> {
        for acl in [default_device_policy(network), default_user_policy(network)] {
            match self.get_default_policy(network, acl.rule_type).await {
                Ok(existing) => {
                    debug!(network = %network, acl = %existing.id, "default {} already present", acl.rule_type);
                }
                Err(Error::NotFound(_)) => {
                    self.insert(&acl).await?;
                    info!(network = %network, acl = %acl.id, name = %acl.name, "installed default acl");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// delete every default policy of a network. returns how many were removed.
    ///
    /// a default deleted concurrently is not an error.
    pub async fn remove_defaults(&self, network: &NetworkId) -> Result<usize> {
        let mut removed = 0;
        for acl in self.list(network).await?.into_iter().filter(|a| a.default) {
            match self.delete(&acl.id).await {
                Ok(()) => removed += 1,
                Err(Error::NotFound(_)) => debug!(acl = %acl.id, "default acl already gone"),
                Err(e) => return Err(e),
            }
        }
        info!(network = %network, removed, "removed default acls");
        Ok(removed)
    }

    /// network lifecycle hook: a network was created.
    pub async fn on_network_created(&self, network: &NetworkId) -> Result<()> {
        self.create_defaults(network).await
    }

    /// network lifecycle hook: a network was deleted.
    ///
    /// non-default policies of the network are the caller's responsibility.
    pub async fn on_network_deleted(&self, network: &NetworkId) -> Result<()> {
        self.remove_defaults(network).await.map(|_| ())
    }
}
