//! access control for meshscale networks.
//!
//! policies are stored per network and come in two flavours: device
//! policies (device tags reaching device tags) and user policies (users and
//! groups reaching device tags). every network starts with an enabled
//! allow-all default of each flavour; communication between two nodes is
//! allowed while the default device policy is enabled, and otherwise only
//! when some device policy of the peer's network matches their tags.
//!
//! [`AclManager`] is the entry point: crud, default bootstrapping and the
//! [`AclManager::is_allowed`] decision all hang off it.

#![warn(missing_docs)]

pub mod authorizer;
pub mod defaults;
pub mod error;
pub mod manager;
pub mod model;
pub mod resolver;
pub mod tag;
pub mod validator;

pub use defaults::{ALL_NODES, ALL_USERS, AUTO_CREATOR, default_device_policy, default_user_policy};
pub use error::{Error, Result, TagField, ValidationFailure, Violation, ViolationReason};
pub use manager::AclManager;
pub use model::{Acl, AclId, AclPolicyType, TrafficDirection, sort_by_name};
pub use resolver::{IdentityResolver, MapIdentityResolver};
pub use tag::{AclPolicyTag, AclTagKind, ParseTagError};
pub use validator::{is_valid, validate};

pub use meshscale_types::{AclConfig, DirectionMode, NetworkScope, ValidationMode};
