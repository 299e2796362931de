//! crud operations on stored policies.
//!
//! every policy of every network lives in one collection with no secondary
//! index, so all listing operations are a full scan followed by a filter.

use std::sync::Arc;

use tracing::{debug, info, warn};

use meshscale_db::{Collection, KvStore};
use meshscale_types::{AclConfig, NetworkId, User, ValidationMode};

use crate::error::{Error, Result};
use crate::model::{Acl, AclId, AclPolicyType};
use crate::resolver::IdentityResolver;
use crate::validator;

/// the policy crud manager.
///
/// also hosts the default-policy bootstrapper and the authorizer, which are
/// layered on the same store and resolver.
pub struct AclManager<D, R> {
    pub(crate) db: D,
    pub(crate) resolver: Arc<R>,
    pub(crate) config: AclConfig,
}

impl<D: Clone, R> Clone for AclManager<D, R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            resolver: Arc::clone(&self.resolver),
            config: self.config.clone(),
        }
    }
}

impl<D, R> AclManager<D, R>
where
    D: KvStore,
    R: IdentityResolver,
{
    /// create a manager over a store and an identity resolver.
    pub fn new(db: D, resolver: R, config: AclConfig) -> Self {
        Self {
            db,
            resolver: Arc::new(resolver),
            config,
        }
    }

    /// the underlying store.
    pub fn db(&self) -> &D {
        &self.db
    }

    /// the identity resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// engine configuration.
    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    /// check a candidate policy under the configured validation mode.
    pub fn is_valid(&self, acl: &Acl) -> bool {
        validator::is_valid(acl, self.resolver.as_ref(), self.config.validation)
    }

    /// gate a candidate policy, returning every violation in strict mode.
    pub fn validate(&self, acl: &Acl) -> Result<()> {
        match validator::validate(acl, self.resolver.as_ref()) {
            Ok(()) => Ok(()),
            Err(failure) if self.config.validation == ValidationMode::Strict => {
                Err(Error::Validation(failure))
            }
            Err(failure) => {
                warn!(acl = %acl.id, %failure, "accepting invalid acl in permissive mode");
                Ok(())
            }
        }
    }

    /// serialize and store a policy under its id, overwriting any previous record.
    pub async fn insert(&self, acl: &Acl) -> Result<()> {
        let value = encode(acl)?;
        self.db
            .put(Collection::ACLS, &acl.id.to_string(), &value)
            .await
            .map_err(Error::Storage)?;
        debug!(acl = %acl.id, network = %acl.network_id, "stored acl");
        Ok(())
    }

    /// validate then insert a user-authored policy.
    pub async fn create(&self, acl: Acl) -> Result<Acl> {
        self.validate(&acl)?;
        self.insert(&acl).await?;
        info!(acl = %acl.id, network = %acl.network_id, name = %acl.name, "created acl");
        Ok(acl)
    }

    /// fetch a policy by id.
    pub async fn get(&self, id: &AclId) -> Result<Acl> {
        let raw = self.db.get(Collection::ACLS, &id.to_string()).await?;
        decode(&raw)
    }

    /// merge `incoming` onto `existing` and persist the result.
    ///
    /// the write only lands if the stored record still equals `existing`;
    /// otherwise this fails with [`Error::Conflict`] and the caller should
    /// re-read and retry. see [`Acl::merged_with`] for the merge rules.
    ///
    /// the swap is keyed on the stored text as read, not a re-encoding of
    /// `existing`, so records written with omitted fields or other formatting
    /// still update.
    pub async fn update(&self, incoming: &Acl, existing: &Acl) -> Result<Acl> {
        let key = existing.id.to_string();
        let stored = self.db.get(Collection::ACLS, &key).await?;
        if decode(&stored)? != *existing {
            return Err(Error::Conflict(existing.id));
        }

        let merged = existing.merged_with(incoming);
        let value = encode(&merged)?;

        self.db
            .compare_and_swap(Collection::ACLS, &key, &stored, &value)
            .await
            .map_err(|e| match e {
                meshscale_db::Error::Conflict(_) => Error::Conflict(existing.id),
                other => other.into(),
            })?;

        debug!(acl = %merged.id, "updated acl");
        Ok(merged)
    }

    /// remove a policy by id.
    pub async fn delete(&self, id: &AclId) -> Result<()> {
        self.db.delete(Collection::ACLS, &id.to_string()).await?;
        debug!(acl = %id, "deleted acl");
        Ok(())
    }

    /// every decodable policy in the collection, across all networks.
    async fn scan(&self) -> Result<Vec<Acl>> {
        let records = self
            .db
            .scan_all(Collection::ACLS)
            .await
            .map_err(Error::Storage)?;

        Ok(records
            .iter()
            .filter_map(|raw| match decode(raw) {
                Ok(acl) => Some(acl),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable acl record");
                    None
                }
            })
            .collect())
    }

    async fn scan_where(&self, keep: impl Fn(&Acl) -> bool) -> Result<Vec<Acl>> {
        let mut acls = self.scan().await?;
        acls.retain(|acl| keep(acl));
        Ok(acls)
    }

    /// every policy of a network.
    pub async fn list(&self, network: &NetworkId) -> Result<Vec<Acl>> {
        self.scan_where(|acl| &acl.network_id == network).await
    }

    /// user policies of a network.
    pub async fn list_user_policies_by_network(&self, network: &NetworkId) -> Result<Vec<Acl>> {
        self.scan_where(|acl| {
            &acl.network_id == network && acl.rule_type == AclPolicyType::UserPolicy
        })
        .await
    }

    /// device policies of a network.
    pub async fn list_device_policies(&self, network: &NetworkId) -> Result<Vec<Acl>> {
        self.scan_where(|acl| {
            &acl.network_id == network && acl.rule_type == AclPolicyType::DevicePolicy
        })
        .await
    }

    /// user policies in any network whose src names the user or one of its groups.
    ///
    /// a wildcard src value matches every user.
    pub async fn list_policies_for_user(&self, user: &User) -> Result<Vec<Acl>> {
        let groups = self.resolver.groups_of(user);
        self.scan_where(|acl| {
            acl.rule_type == AclPolicyType::UserPolicy
                && acl.src.iter().any(|tag| {
                    tag.is_wildcard()
                        || tag.value == user.username
                        || groups.iter().any(|g| g.as_str() == tag.value)
                })
        })
        .await
    }

    /// [`Self::list_policies_for_user`] narrowed to one network.
    pub async fn list_policies_for_user_in_network(
        &self,
        user: &User,
        network: &NetworkId,
    ) -> Result<Vec<Acl>> {
        let mut acls = self.list_policies_for_user(user).await?;
        acls.retain(|acl| &acl.network_id == network);
        Ok(acls)
    }

    /// the default policy of the given rule type in a network.
    pub async fn get_default_policy(
        &self,
        network: &NetworkId,
        rule_type: AclPolicyType,
    ) -> Result<Acl> {
        self.list(network)
            .await?
            .into_iter()
            .find(|acl| acl.default && acl.rule_type == rule_type)
            .ok_or_else(|| Error::NotFound(format!("default {rule_type} for network {network}")))
    }
}

fn encode(acl: &Acl) -> Result<String> {
    serde_json::to_string(acl).map_err(Error::Serialization)
}

fn decode(raw: &str) -> Result<Acl> {
    serde_json::from_str(raw).map_err(Error::Deserialization)
}
