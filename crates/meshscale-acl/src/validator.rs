//! structural and referential checks on candidate policies.
//!
//! user policies take users and groups in src and devices in dst. device
//! policies take devices on both sides. a wildcard is always accepted for
//! an allowed kind; any other value must exist in the identity subsystem.

use tracing::warn;

use meshscale_types::ValidationMode;

use crate::error::{TagField, ValidationFailure, Violation, ViolationReason};
use crate::model::{Acl, AclPolicyType};
use crate::resolver::IdentityResolver;
use crate::tag::{AclPolicyTag, AclTagKind};

/// check every tag of the policy, collecting all violations.
pub fn validate<R>(acl: &Acl, resolver: &R) -> Result<(), ValidationFailure>
where
    R: IdentityResolver + ?Sized,
{
    let src_kinds: &[AclTagKind] = match acl.rule_type {
        AclPolicyType::UserPolicy => &[AclTagKind::User, AclTagKind::UserGroup],
        AclPolicyType::DevicePolicy => &[AclTagKind::Device],
    };

    let violations: Vec<Violation> = check_list(TagField::Src, &acl.src, src_kinds, resolver)
        .chain(check_list(TagField::Dst, &acl.dst, &[AclTagKind::Device], resolver))
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure {
            rule_type: acl.rule_type,
            violations,
        })
    }
}

/// decide validity under the given mode.
///
/// permissive mode accepts every policy but still logs what strict mode
/// would have rejected.
pub fn is_valid<R>(acl: &Acl, resolver: &R, mode: ValidationMode) -> bool
where
    R: IdentityResolver + ?Sized,
{
    match (validate(acl, resolver), mode) {
        (Ok(()), _) => true,
        (Err(_), ValidationMode::Strict) => false,
        (Err(failure), ValidationMode::Permissive) => {
            warn!(acl = %acl.id, %failure, "accepting invalid acl in permissive mode");
            true
        }
    }
}

fn check_list<'a, R>(
    field: TagField,
    tags: &'a [AclPolicyTag],
    allowed: &'a [AclTagKind],
    resolver: &'a R,
) -> impl Iterator<Item = Violation> + 'a
where
    R: IdentityResolver + ?Sized,
{
    tags.iter().enumerate().filter_map(move |(index, tag)| {
        check_tag(tag, allowed, resolver).map(|reason| Violation {
            field,
            index,
            tag: tag.clone(),
            reason,
        })
    })
}

fn check_tag<R>(tag: &AclPolicyTag, allowed: &[AclTagKind], resolver: &R) -> Option<ViolationReason>
where
    R: IdentityResolver + ?Sized,
{
    if tag.value.is_empty() {
        return Some(ViolationReason::EmptyValue);
    }
    if !allowed.contains(&tag.kind) {
        return Some(ViolationReason::KindNotAllowed(tag.kind));
    }
    if tag.is_wildcard() {
        return None;
    }

    let value = tag.value.as_str();
    match tag.kind {
        AclTagKind::User if !resolver.user_exists(value) => {
            Some(ViolationReason::UnknownUser(value.to_string()))
        }
        AclTagKind::UserGroup if !resolver.group_exists(value) => {
            Some(ViolationReason::UnknownGroup(value.to_string()))
        }
        AclTagKind::Device if !resolver.device_tag_exists(value) => {
            Some(ViolationReason::UnknownDeviceTag(value.to_string()))
        }
        _ => None,
    }
}
