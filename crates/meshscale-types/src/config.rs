//! configuration types for meshscale

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// main configuration for meshscale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// database configuration.
    pub database: DatabaseConfig,

    /// access-control engine behaviour.
    pub acl: AclConfig,

    /// static identity data (users, groups, device tags).
    pub identity: IdentityConfig,

    /// log level (trace, debug, info, warn, error).
    pub log_level: Option<String>,
}

/// database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// database type: "sqlite" or "postgres".
    pub db_type: String,

    /// database connection string or file path.
    pub connection_string: String,

    /// sqlite-specific options.
    pub sqlite: SqliteConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "/var/lib/meshscale/db.sqlite".to_string(),
            sqlite: SqliteConfig::default(),
        }
    }
}

/// sqlite-specific options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// enable write-ahead logging.
    pub write_ahead_log: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            write_ahead_log: true,
        }
    }
}

/// how candidate policies are judged before persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// a policy is valid only if no tag violates its rule type.
    #[default]
    Strict,
    /// legacy behaviour: any policy with a known rule type is valid.
    /// violations are still collected and logged.
    Permissive,
}

/// which network's device policies the authorizer enumerates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkScope {
    /// legacy behaviour: enumerate the peer's network.
    #[default]
    PeerNetwork,
    /// node and peer must share a network; mismatches are denied.
    SharedNetwork,
}

/// whether a policy's allowed direction constrains matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionMode {
    /// legacy behaviour: tags match in either direction regardless of the policy.
    #[default]
    Symmetric,
    /// unidirectional policies only authorize src -> dst.
    Enforced,
}

/// access-control engine behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// validator mode.
    pub validation: ValidationMode,

    /// network scope for device policy enumeration.
    pub network_scope: NetworkScope,

    /// direction handling during matching.
    pub direction: DirectionMode,

    /// consider disabled device policies when matching tags.
    pub include_disabled: bool,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Strict,
            network_scope: NetworkScope::PeerNetwork,
            direction: DirectionMode::Symmetric,
            include_disabled: true,
        }
    }
}

/// static identity data.
///
/// the identity subsystem is external to meshscale; this is the
/// operator-provided view of it used to resolve policy tag references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// known usernames.
    pub users: Vec<String>,

    /// group definitions mapping group ids to member usernames.
    pub groups: BTreeMap<String, Vec<String>>,

    /// known device tag ids.
    pub device_tags: Vec<String>,
}
