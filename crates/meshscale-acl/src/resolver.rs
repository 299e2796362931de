//! lookups into the identity subsystem.
//!
//! users, groups and device tags are owned elsewhere; the acl engine only
//! asks whether a referenced identifier exists and which tags or groups an
//! entity carries.

use std::collections::{BTreeSet, HashMap, HashSet};

use meshscale_types::{IdentityConfig, Node, TagId, User, UserGroupId};

/// answers identity questions for validation and matching.
pub trait IdentityResolver: Send + Sync {
    /// check if a user with this username exists.
    fn user_exists(&self, username: &str) -> bool;

    /// check if a user group with this id exists.
    fn group_exists(&self, group: &str) -> bool;

    /// check if a device tag with this id exists.
    fn device_tag_exists(&self, tag: &str) -> bool;

    /// the device tags attached to a node.
    fn tags_of(&self, node: &Node) -> BTreeSet<TagId> {
        node.tags().clone()
    }

    /// the groups a user belongs to.
    fn groups_of(&self, user: &User) -> BTreeSet<UserGroupId> {
        user.groups.clone()
    }
}

/// an identity resolver backed by in-memory sets.
///
/// this is typically built from the `[identity]` section of the config.
#[derive(Debug, Clone, Default)]
pub struct MapIdentityResolver {
    users: HashSet<String>,
    groups: HashMap<String, HashSet<String>>,
    device_tags: HashSet<String>,
}

impl MapIdentityResolver {
    /// create an empty resolver; nothing exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// builder-style: register users.
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    /// builder-style: register a group and its members.
    pub fn with_group<I, S>(mut self, group: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups
            .entry(group.into())
            .or_default()
            .extend(members.into_iter().map(Into::into));
        self
    }

    /// builder-style: register device tags.
    pub fn with_device_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.device_tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

impl From<&IdentityConfig> for MapIdentityResolver {
    fn from(config: &IdentityConfig) -> Self {
        let mut resolver = Self::new()
            .with_users(config.users.iter().cloned())
            .with_device_tags(config.device_tags.iter().cloned());
        for (group, members) in &config.groups {
            resolver = resolver.with_group(group.clone(), members.iter().cloned());
        }
        resolver
    }
}

impl IdentityResolver for MapIdentityResolver {
    fn user_exists(&self, username: &str) -> bool {
        self.users.contains(username)
    }

    fn group_exists(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    fn device_tag_exists(&self, tag: &str) -> bool {
        self.device_tags.contains(tag)
    }

    /// memberships carried by the user plus those declared on configured groups.
    fn groups_of(&self, user: &User) -> BTreeSet<UserGroupId> {
        let mut groups = user.groups.clone();
        groups.extend(
            self.groups
                .iter()
                .filter(|(_, members)| members.contains(&user.username))
                .map(|(group, _)| UserGroupId::new(group.as_str())),
        );
        groups
    }
}
