//! shared setup for engine tests.

#![allow(dead_code)]

use meshscale::Engine;
use meshscale_acl::{Acl, AclPolicyTag, AclPolicyType, TrafficDirection};
use meshscale_db::MeshscaleDb;
use meshscale_types::{AclConfig, Config, IdentityConfig, NetworkId, Node, test_utils::TestNodeBuilder};

/// config with the identities used across the tests.
pub fn test_config(acl: AclConfig) -> Config {
    let mut identity = IdentityConfig {
        users: vec!["alice".into(), "bob".into()],
        device_tags: vec!["tagA".into(), "tagB".into(), "tagC".into()],
        ..Default::default()
    };
    identity
        .groups
        .insert("engineering".into(), vec!["alice".into()]);

    Config {
        acl,
        identity,
        ..Default::default()
    }
}

/// an engine over a fresh in-memory database.
pub async fn engine_with(acl: AclConfig) -> Engine {
    let db = MeshscaleDb::new_in_memory().await.unwrap();
    meshscale::engine(db, &test_config(acl))
}

pub fn skynet() -> NetworkId {
    NetworkId::new("skynet").unwrap()
}

pub fn node(network: &str, tags: &[&str]) -> Node {
    TestNodeBuilder::new(network).with_tags(tags).build()
}

/// device policy tagA -> tagB in skynet.
pub fn a_to_b() -> Acl {
    Acl::new(skynet(), "a-to-b", AclPolicyType::DevicePolicy)
        .with_src([AclPolicyTag::device("tagA")])
        .with_dst([AclPolicyTag::device("tagB")])
        .with_direction(TrafficDirection::Unidirectional)
        .with_creator("admin")
}

/// install skynet's defaults and disable the default device policy.
pub async fn disable_default_device_policy(engine: &Engine) {
    engine.on_network_created(&skynet()).await.unwrap();
    let default = engine
        .get_default_policy(&skynet(), AclPolicyType::DevicePolicy)
        .await
        .unwrap();
    engine
        .update(&default.clone().with_enabled(false), &default)
        .await
        .unwrap();
}
