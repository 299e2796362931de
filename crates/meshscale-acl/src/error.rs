//! error types for meshscale-acl.

use std::fmt;

use thiserror::Error;

use crate::model::{AclId, AclPolicyType};
use crate::tag::{AclPolicyTag, AclTagKind};

/// errors that can occur in meshscale-acl.
#[derive(Debug, Error)]
pub enum Error {
    /// no policy matches the lookup.
    #[error("acl not found: {0}")]
    NotFound(String),

    /// a policy could not be encoded for storage.
    #[error("failed to encode acl: {0}")]
    Serialization(#[source] serde_json::Error),

    /// a stored record could not be decoded as a policy.
    #[error("failed to decode acl: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// the key-value store failed.
    #[error("storage error: {0}")]
    Storage(#[source] meshscale_db::Error),

    /// the stored policy changed between read and update.
    #[error("acl {0} was modified concurrently")]
    Conflict(AclId),

    /// the policy was rejected by the validator.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

impl From<meshscale_db::Error> for Error {
    fn from(err: meshscale_db::Error) -> Self {
        match err {
            meshscale_db::Error::NotFound(key) => Error::NotFound(key),
            other => Error::Storage(other),
        }
    }
}

/// which list of a policy a tag sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    /// the src list.
    Src,
    /// the dst list.
    Dst,
}

impl fmt::Display for TagField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagField::Src => "src",
            TagField::Dst => "dst",
        })
    }
}

/// why a single tag was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationReason {
    /// the tag has an empty value.
    #[error("value cannot be empty")]
    EmptyValue,

    /// the tag kind is not allowed in this position.
    #[error("{0} tags are not allowed here")]
    KindNotAllowed(AclTagKind),

    /// the referenced user does not exist.
    #[error("user {0} does not exist")]
    UnknownUser(String),

    /// the referenced user group does not exist.
    #[error("user group {0} does not exist")]
    UnknownGroup(String),

    /// the referenced device tag does not exist.
    #[error("device tag {0} does not exist")]
    UnknownDeviceTag(String),
}

/// a rejected tag and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// src or dst.
    pub field: TagField,
    /// zero-based position in the list.
    pub index: usize,
    /// the offending tag.
    pub tag: AclPolicyTag,
    /// what is wrong with it.
    pub reason: ViolationReason,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}: {}", self.field, self.index, self.tag, self.reason)
    }
}

/// every violation found in a rejected policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// the rule type the policy was checked against.
    pub rule_type: AclPolicyType,
    /// violations in src order, then dst order. never empty.
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}", self.rule_type)?;
        for (i, violation) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// result type for meshscale-acl operations.
pub type Result<T> = std::result::Result<T, Error>;
