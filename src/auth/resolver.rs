//! Effective-permission resolution.
//!
//! One directory read, then a pure computation: built-in-role bypass,
//! else the decoded custom-role bag, else the empty set.

use async_trait::async_trait;
use uuid::Uuid;

use super::permissions::{EffectivePermissions, PermissionSet};
use crate::error::{ActionError, AdminResult};
use crate::models::{MembershipRecord, Organization};

/// Read side of the membership directory needed for authorization.
///
/// Implemented by the Postgres member repository; tests substitute an
/// in-memory directory.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn organization_by_slug(&self, slug: &str) -> AdminResult<Option<Organization>>;

    async fn membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> AdminResult<Option<MembershipRecord>>;
}

/// Resolve the caller's effective permissions within an organization.
///
/// Fails only when the user is not a member; bag contents can never fail
/// resolution.
pub async fn resolve_permissions<D: MemberDirectory + ?Sized>(
    directory: &D,
    organization_id: Uuid,
    user_id: Uuid,
) -> AdminResult<EffectivePermissions> {
    let membership = directory
        .membership(organization_id, user_id)
        .await?
        .ok_or(ActionError::NotAMember)?;

    Ok(effective_for(&membership))
}

/// Pure core of the resolver.
#[must_use]
pub fn effective_for(membership: &MembershipRecord) -> EffectivePermissions {
    if membership.role.bypasses_permissions() {
        return EffectivePermissions::All;
    }

    match &membership.permission_bag {
        Some(bag) => EffectivePermissions::Granted(PermissionSet::from_bag_json(bag)),
        None => EffectivePermissions::empty(),
    }
}
