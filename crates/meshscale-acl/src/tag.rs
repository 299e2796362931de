//! policy tags: the kind/value pairs listed in a policy's src and dst.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use meshscale_types::WILDCARD;

/// what a policy tag refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AclTagKind {
    /// a single user, by username.
    User,
    /// a user group, by group id.
    UserGroup,
    /// every device carrying a device tag.
    Device,
}

impl AclTagKind {
    /// the name used when storing or printing the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclTagKind::User => "user",
            AclTagKind::UserGroup => "user-group",
            AclTagKind::Device => "device",
        }
    }
}

impl fmt::Display for AclTagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclTagKind {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(AclTagKind::User),
            "user-group" | "group" => Ok(AclTagKind::UserGroup),
            "device" | "tag" => Ok(AclTagKind::Device),
            other => Err(ParseTagError::UnknownKind(other.to_string())),
        }
    }
}

/// one entry of a policy's src or dst list.
///
/// a value of `*` refers to every entity of the kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AclPolicyTag {
    /// what the value refers to.
    pub kind: AclTagKind,
    /// the referenced identifier, or `*`.
    pub value: String,
}

impl AclPolicyTag {
    /// create a tag.
    pub fn new(kind: AclTagKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// a user tag.
    pub fn user(username: impl Into<String>) -> Self {
        Self::new(AclTagKind::User, username)
    }

    /// a user-group tag.
    pub fn user_group(group: impl Into<String>) -> Self {
        Self::new(AclTagKind::UserGroup, group)
    }

    /// a device tag.
    pub fn device(tag: impl Into<String>) -> Self {
        Self::new(AclTagKind::Device, tag)
    }

    /// a wildcard tag of the given kind.
    pub fn wildcard(kind: AclTagKind) -> Self {
        Self::new(kind, WILDCARD)
    }

    /// check if this tag refers to every entity of its kind.
    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }
}

impl fmt::Display for AclPolicyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.value)
    }
}

impl FromStr for AclPolicyTag {
    type Err = ParseTagError;

    /// parse `kind:value`, e.g. `device:tagA` or `user-group:*`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| ParseTagError::MissingSeparator(s.to_string()))?;
        Ok(Self::new(kind.parse()?, value))
    }
}

/// errors from parsing a `kind:value` tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseTagError {
    /// no `:` between kind and value.
    #[error("expected kind:value, got: {0}")]
    MissingSeparator(String),

    /// the kind is not user, user-group or device.
    #[error("unknown tag kind: {0}")]
    UnknownKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            "device:tagA".parse::<AclPolicyTag>().unwrap(),
            AclPolicyTag::device("tagA")
        );
        assert_eq!(
            "user-group:*".parse::<AclPolicyTag>().unwrap(),
            AclPolicyTag::wildcard(AclTagKind::UserGroup)
        );
        assert_eq!(
            "user:alice".parse::<AclPolicyTag>().unwrap(),
            AclPolicyTag::user("alice")
        );
        // aliases
        assert_eq!(
            "tag:web".parse::<AclPolicyTag>().unwrap(),
            AclPolicyTag::device("web")
        );
    }

    #[test]
    fn test_parse_keeps_colons_in_value() {
        let tag: AclPolicyTag = "device:a:b".parse().unwrap();
        assert_eq!(tag.value, "a:b");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "tagA".parse::<AclPolicyTag>(),
            Err(ParseTagError::MissingSeparator("tagA".to_string()))
        );
        assert_eq!(
            "printer:tagA".parse::<AclPolicyTag>(),
            Err(ParseTagError::UnknownKind("printer".to_string()))
        );
    }

    #[test]
    fn test_empty_value_parses() {
        // emptiness is the validator's concern
        let tag: AclPolicyTag = "device:".parse().unwrap();
        assert!(tag.value.is_empty());
    }

    #[test]
    fn test_wildcard() {
        assert!(AclPolicyTag::wildcard(AclTagKind::Device).is_wildcard());
        assert!(!AclPolicyTag::device("tagA").is_wildcard());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&AclPolicyTag::user_group("ops")).unwrap();
        assert_eq!(json, r#"{"kind":"user-group","value":"ops"}"#);

        let empty_kind = serde_json::from_str::<AclPolicyTag>(r#"{"kind":"","value":"x"}"#);
        assert!(empty_kind.is_err());
    }

    fn kind_strategy() -> impl Strategy<Value = AclTagKind> {
        prop_oneof![
            Just(AclTagKind::User),
            Just(AclTagKind::UserGroup),
            Just(AclTagKind::Device),
        ]
    }

    proptest! {
        #[test]
        fn display_parses_back(kind in kind_strategy(), value in "[a-zA-Z0-9:*_-]{0,24}") {
            let tag = AclPolicyTag::new(kind, value);
            let parsed: AclPolicyTag = tag.to_string().parse().unwrap();
            prop_assert_eq!(parsed, tag);
        }
    }
}
