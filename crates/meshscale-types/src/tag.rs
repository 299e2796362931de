//! validated tag identifier for device tagging.
//!
//! tag identifiers must:
//! - Be non-empty and at most 128 characters
//! - Contain no whitespace or control characters
//! - Not be the wildcard sentinel `*`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// maximum length for a tag identifier.
pub const MAX_TAG_ID_LEN: usize = 128;

/// the wildcard sentinel used in policy tags to mean "every entity of that kind".
pub const WILDCARD: &str = "*";

/// a validated device tag identifier.
///
/// # Example
/// ```
/// use meshscale_types::TagId;
///
/// let tag: TagId = "skynet.web".parse().unwrap();
/// assert_eq!(tag.as_str(), "skynet.web");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(String);

impl TagId {
    /// create a new tag identifier, validating the format.
    pub fn new(s: impl Into<String>) -> Result<Self, TagError> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// get the tag identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), TagError> {
        if s.is_empty() {
            return Err(TagError::Empty);
        }

        if s == WILDCARD {
            return Err(TagError::Wildcard);
        }

        let len = s.chars().count();
        if len > MAX_TAG_ID_LEN {
            return Err(TagError::TooLong(len));
        }

        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TagError::InvalidCharacters);
        }

        Ok(())
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TagId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TagId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TagId {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// serde: deserialize with validation
impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TagId::new(s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for TagId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// error type for tag validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// tag identifier cannot be empty.
    #[error("tag id cannot be empty")]
    Empty,
    /// the wildcard is only meaningful inside a policy, never on a node.
    #[error("tag id cannot be the wildcard '*'")]
    Wildcard,
    /// tag identifier exceeds maximum length.
    #[error("tag id too long ({0} chars, max {max})", max = MAX_TAG_ID_LEN)]
    TooLong(usize),
    /// tag identifier contains whitespace or control characters.
    #[error("tag id must not contain whitespace or control characters")]
    InvalidCharacters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tags() {
        assert!(TagId::new("tagA").is_ok());
        assert!(TagId::new("skynet.web-server").is_ok());
        assert!(TagId::new("db_server").is_ok());
        assert!(TagId::new("a").is_ok());
    }

    #[test]
    fn test_invalid_tags() {
        assert_eq!(TagId::new("").unwrap_err(), TagError::Empty);
        assert_eq!(TagId::new("*").unwrap_err(), TagError::Wildcard);
        assert_eq!(
            TagId::new("has spaces").unwrap_err(),
            TagError::InvalidCharacters
        );
        assert_eq!(
            TagId::new("tab\there").unwrap_err(),
            TagError::InvalidCharacters
        );
    }

    #[test]
    fn test_tag_too_long() {
        let long = "a".repeat(MAX_TAG_ID_LEN + 1);
        assert!(matches!(
            TagId::new(long).unwrap_err(),
            TagError::TooLong(_)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let tag = TagId::new("tagB").unwrap();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"tagB\"");

        let parsed: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tag);
    }

    #[test]
    fn test_serde_invalid() {
        let result: Result<TagId, _> = serde_json::from_str("\"*\"");
        assert!(result.is_err());
    }
}
