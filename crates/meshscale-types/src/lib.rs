//! core types for meshscale - the access-control engine of a mesh overlay control plane.
//!
//! this crate provides the data structures shared by every other meshscale crate:
//! - [`NetworkId`]: the logical network a node or policy belongs to
//! - [`Node`]: an overlay device and the tags attached to it
//! - [`User`]: an authenticated user and its group memberships
//! - [`TagId`]: validated device tag identifier
//! - [`Config`]: application configuration

#![warn(missing_docs)]

mod config;
mod error;
mod network;
mod node;
mod tag;
mod user;

pub mod test_utils;

pub use config::{
    AclConfig, Config, DatabaseConfig, DirectionMode, IdentityConfig, NetworkScope, SqliteConfig,
    ValidationMode,
};
pub use error::Error;
pub use network::NetworkId;
pub use node::{Node, NodeId};
pub use tag::{MAX_TAG_ID_LEN, TagError, TagId, WILDCARD};
pub use user::{User, UserGroupId};
