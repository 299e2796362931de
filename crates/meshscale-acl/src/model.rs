//! the access-control policy record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use meshscale_types::NetworkId;

use crate::tag::AclPolicyTag;

/// unique identifier of a policy, used as its storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AclId(Uuid);

impl AclId {
    /// generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for AclId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for AclId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for AclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// what a policy governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AclPolicyType {
    /// users and groups reaching devices.
    UserPolicy,
    /// devices reaching devices.
    DevicePolicy,
}

impl fmt::Display for AclPolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            AclPolicyType::UserPolicy => "user-policy",
            AclPolicyType::DevicePolicy => "device-policy",
        })
    }
}

/// which way traffic may flow between src and dst.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrafficDirection {
    /// src may reach dst.
    #[default]
    #[serde(rename = "uni")]
    Unidirectional,
    /// src and dst may reach each other.
    #[serde(rename = "bi")]
    Bidirectional,
}

/// a named access-control policy scoped to one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    /// storage key.
    pub id: AclId,
    /// owning network.
    pub network_id: NetworkId,
    /// what the policy governs.
    pub rule_type: AclPolicyType,
    /// human-readable name, not required to be unique.
    pub name: String,
    /// true only for policies created by the default bootstrapper.
    #[serde(default)]
    pub default: bool,
    /// sources.
    #[serde(default)]
    pub src: Vec<AclPolicyTag>,
    /// destinations.
    #[serde(default)]
    pub dst: Vec<AclPolicyTag>,
    /// permitted traffic direction.
    #[serde(default)]
    pub allowed_direction: TrafficDirection,
    /// whether the policy is in force.
    pub enabled: bool,
    /// creator; `auto` for system-created policies.
    pub created_by: String,
    /// creation time.
    pub created_at: DateTime<Utc>,
}

impl Acl {
    /// create an enabled, non-default policy with empty src and dst.
    pub fn new(network_id: NetworkId, name: impl Into<String>, rule_type: AclPolicyType) -> Self {
        Self {
            id: AclId::generate(),
            network_id,
            rule_type,
            name: name.into(),
            default: false,
            src: vec![],
            dst: vec![],
            allowed_direction: TrafficDirection::default(),
            enabled: true,
            created_by: String::new(),
            created_at: Utc::now(),
        }
    }

    /// builder-style: set the sources.
    pub fn with_src(mut self, src: impl IntoIterator<Item = AclPolicyTag>) -> Self {
        self.src = src.into_iter().collect();
        self
    }

    /// builder-style: set the destinations.
    pub fn with_dst(mut self, dst: impl IntoIterator<Item = AclPolicyTag>) -> Self {
        self.dst = dst.into_iter().collect();
        self
    }

    /// builder-style: set the allowed direction.
    pub fn with_direction(mut self, direction: TrafficDirection) -> Self {
        self.allowed_direction = direction;
        self
    }

    /// builder-style: set the creator.
    pub fn with_creator(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// builder-style: set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// apply an update on top of this stored policy.
    ///
    /// only the name (when non-empty), src, dst, allowed direction and
    /// enabled flag are taken from `incoming`. identity, network, rule
    /// type, default flag and provenance stay as stored.
    pub fn merged_with(&self, incoming: &Acl) -> Acl {
        let mut merged = self.clone();
        if !incoming.name.is_empty() {
            merged.name = incoming.name.clone();
        }
        merged.src = incoming.src.clone();
        merged.dst = incoming.dst.clone();
        merged.allowed_direction = incoming.allowed_direction;
        merged.enabled = incoming.enabled;
        merged
    }
}

/// sort policies by name, ascending. ties keep their relative order.
pub fn sort_by_name(acls: &mut [Acl]) {
    acls.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::AclTagKind;
    use proptest::prelude::*;

    fn net(id: &str) -> NetworkId {
        NetworkId::new(id).unwrap()
    }

    #[test]
    fn test_serde_shape() {
        let acl = Acl::new(net("skynet"), "web", AclPolicyType::DevicePolicy)
            .with_src([AclPolicyTag::device("tagA")])
            .with_dst([AclPolicyTag::device("tagB")])
            .with_direction(TrafficDirection::Bidirectional);

        let value = serde_json::to_value(&acl).unwrap();
        assert_eq!(value["network_id"], "skynet");
        assert_eq!(value["rule_type"], "device-policy");
        assert_eq!(value["allowed_direction"], "bi");
        assert_eq!(value["src"][0]["kind"], "device");
        assert_eq!(value["id"], acl.id.to_string());

        let decoded: Acl = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, acl);
    }

    #[test]
    fn test_unknown_rule_type_rejected() {
        let mut value =
            serde_json::to_value(Acl::new(net("skynet"), "x", AclPolicyType::UserPolicy)).unwrap();
        value["rule_type"] = "admin-policy".into();
        assert!(serde_json::from_value::<Acl>(value).is_err());
    }

    #[test]
    fn test_acl_id_parse() {
        let id = AclId::generate();
        assert_eq!(id.to_string().parse::<AclId>().unwrap(), id);
        assert!("not-a-uuid".parse::<AclId>().is_err());
    }

    #[test]
    fn test_merge_keeps_name_when_incoming_empty() {
        let stored = Acl::new(net("skynet"), "stored", AclPolicyType::DevicePolicy);
        let incoming = Acl::new(net("skynet"), "", AclPolicyType::DevicePolicy).with_enabled(false);

        let merged = stored.merged_with(&incoming);
        assert_eq!(merged.name, "stored");
        assert!(!merged.enabled);
    }

    #[test]
    fn test_sort_by_name() {
        let mut acls: Vec<Acl> = ["c", "a", "b"]
            .into_iter()
            .map(|n| Acl::new(net("skynet"), n, AclPolicyType::DevicePolicy))
            .collect();
        sort_by_name(&mut acls);
        let names: Vec<_> = acls.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    fn tag_strategy() -> impl Strategy<Value = AclPolicyTag> {
        (
            prop_oneof![
                Just(AclTagKind::User),
                Just(AclTagKind::UserGroup),
                Just(AclTagKind::Device)
            ],
            "[a-z*]{0,6}",
        )
            .prop_map(|(kind, value)| AclPolicyTag::new(kind, value))
    }

    fn acl_strategy() -> impl Strategy<Value = Acl> {
        (
            "[a-z]{0,8}",
            prop_oneof![
                Just(AclPolicyType::UserPolicy),
                Just(AclPolicyType::DevicePolicy)
            ],
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            prop::collection::vec(tag_strategy(), 0..4),
            prop::collection::vec(tag_strategy(), 0..4),
            "[a-z]{1,6}",
        )
            .prop_map(|(name, rule_type, default, enabled, bi, src, dst, network)| {
                let mut acl = Acl::new(net(&network), name, rule_type)
                    .with_src(src)
                    .with_dst(dst)
                    .with_enabled(enabled)
                    .with_creator("someone");
                acl.default = default;
                if bi {
                    acl.allowed_direction = TrafficDirection::Bidirectional;
                }
                acl
            })
    }

    proptest! {
        #[test]
        fn merge_only_touches_mutable_fields(stored in acl_strategy(), incoming in acl_strategy()) {
            let merged = stored.merged_with(&incoming);

            prop_assert_eq!(merged.id, stored.id);
            prop_assert_eq!(&merged.network_id, &stored.network_id);
            prop_assert_eq!(merged.rule_type, stored.rule_type);
            prop_assert_eq!(merged.default, stored.default);
            prop_assert_eq!(&merged.created_by, &stored.created_by);
            prop_assert_eq!(merged.created_at, stored.created_at);

            prop_assert_eq!(&merged.src, &incoming.src);
            prop_assert_eq!(&merged.dst, &incoming.dst);
            prop_assert_eq!(merged.allowed_direction, incoming.allowed_direction);
            prop_assert_eq!(merged.enabled, incoming.enabled);
            if incoming.name.is_empty() {
                prop_assert_eq!(&merged.name, &stored.name);
            } else {
                prop_assert_eq!(&merged.name, &incoming.name);
            }
        }

        #[test]
        fn sort_is_ordered_permutation(mut acls in prop::collection::vec(acl_strategy(), 0..12)) {
            let mut before: Vec<AclId> = acls.iter().map(|a| a.id).collect();
            sort_by_name(&mut acls);

            prop_assert!(acls.windows(2).all(|w| w[0].name <= w[1].name));
            let mut after: Vec<AclId> = acls.iter().map(|a| a.id).collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }
    }
}
