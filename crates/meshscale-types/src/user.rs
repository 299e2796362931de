//! user type representing an authenticated overlay user.
//!
//! users and groups are owned by the identity subsystem; meshscale only
//! needs the username and the groups the user belongs to when evaluating
//! user policies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// identifier of a user group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserGroupId(String);

impl UserGroupId {
    /// create a group id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// get the group id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserGroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for UserGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// unique username; this is the identifier user policies reference.
    pub username: String,

    /// groups the user is a member of.
    #[serde(default)]
    pub groups: BTreeSet<UserGroupId>,
}

impl User {
    /// create a user with no group memberships.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            groups: BTreeSet::new(),
        }
    }

    /// builder-style: add group memberships.
    pub fn with_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<UserGroupId>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// check whether the user belongs to a group.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.as_str() == group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_groups() {
        let user = User::new("alice").with_groups(["engineering", "admins"]);
        assert!(user.in_group("engineering"));
        assert!(!user.in_group("sales"));
        assert_eq!(user.groups.len(), 2);
    }

    #[test]
    fn test_user_serde_without_groups() {
        let user: User = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(user.username, "bob");
        assert!(user.groups.is_empty());
    }
}
