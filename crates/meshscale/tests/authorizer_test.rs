//! tests for communication authorization between nodes.

mod common;

use common::{a_to_b, disable_default_device_policy, engine_with, node, skynet, test_config};
use meshscale_acl::{AclConfig, AclPolicyType, DirectionMode, NetworkScope};
use tempfile::TempDir;

#[tokio::test]
async fn test_enabled_default_allows_untagged_nodes() {
    let engine = engine_with(AclConfig::default()).await;
    engine.on_network_created(&skynet()).await.unwrap();

    assert!(engine.is_allowed(&node("skynet", &[]), &node("skynet", &[])).await);
    assert!(
        engine
            .is_allowed(&node("skynet", &["tagA"]), &node("skynet", &["tagC"]))
            .await
    );
}

#[tokio::test]
async fn test_tag_policy_matches_in_both_directions() {
    let engine = engine_with(AclConfig::default()).await;
    disable_default_device_policy(&engine).await;
    engine.create(a_to_b()).await.unwrap();

    let a = node("skynet", &["tagA"]);
    let b = node("skynet", &["tagB"]);
    assert!(engine.is_allowed(&a, &b).await);
    assert!(engine.is_allowed(&b, &a).await);
}

#[tokio::test]
async fn test_no_tag_overlap_denies() {
    let engine = engine_with(AclConfig::default()).await;
    disable_default_device_policy(&engine).await;
    engine.create(a_to_b()).await.unwrap();

    assert!(
        !engine
            .is_allowed(&node("skynet", &["tagC"]), &node("skynet", &["tagB"]))
            .await
    );
}

#[tokio::test]
async fn test_enforced_direction_blocks_reverse() {
    let engine = engine_with(AclConfig {
        direction: DirectionMode::Enforced,
        ..Default::default()
    })
    .await;
    disable_default_device_policy(&engine).await;
    engine.create(a_to_b()).await.unwrap();

    let a = node("skynet", &["tagA"]);
    let b = node("skynet", &["tagB"]);
    assert!(engine.is_allowed(&a, &b).await);
    assert!(!engine.is_allowed(&b, &a).await);
}

#[tokio::test]
async fn test_network_scope_alternatives() {
    let outsider = node("elsewhere", &["tagA"]);
    let peer = node("skynet", &["tagB"]);

    // legacy: the peer's network supplies the policies
    let engine = engine_with(AclConfig::default()).await;
    disable_default_device_policy(&engine).await;
    engine.create(a_to_b()).await.unwrap();
    assert!(engine.is_allowed(&outsider, &peer).await);

    // shared network: mismatched networks are denied outright
    let engine = engine_with(AclConfig {
        network_scope: NetworkScope::SharedNetwork,
        ..Default::default()
    })
    .await;
    disable_default_device_policy(&engine).await;
    engine.create(a_to_b()).await.unwrap();
    assert!(!engine.is_allowed(&outsider, &peer).await);
}

#[tokio::test]
async fn test_network_teardown_removes_fast_path() {
    let engine = engine_with(AclConfig::default()).await;
    engine.on_network_created(&skynet()).await.unwrap();
    engine.on_network_deleted(&skynet()).await.unwrap();

    assert!(
        !engine
            .is_allowed(&node("skynet", &["tagA"]), &node("skynet", &["tagB"]))
            .await
    );
}

#[tokio::test]
async fn test_decisions_persist_in_file_database() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(AclConfig::default());
    config.database.connection_string = dir.path().join("db.sqlite").display().to_string();

    {
        let engine = meshscale::connect(&config).await.unwrap();
        disable_default_device_policy(&engine).await;
        engine.create(a_to_b()).await.unwrap();
    }

    let engine = meshscale::connect(&config).await.unwrap();
    let default = engine
        .get_default_policy(&skynet(), AclPolicyType::DevicePolicy)
        .await
        .unwrap();
    assert!(!default.enabled);
    assert!(
        engine
            .is_allowed(&node("skynet", &["tagA"]), &node("skynet", &["tagB"]))
            .await
    );
}
