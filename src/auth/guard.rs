//! Server-action guard.
//!
//! Every entry point declares an [`AccessRequirement`]; the guard
//! re-derives the caller's organization and membership server-side
//! (client-supplied role claims are never consulted), resolves effective
//! permissions and either returns the request's tenant context or a
//! typed rejection.

use tracing::warn;
use uuid::Uuid;

use super::permissions::{AccessRequirement, EffectivePermissions, Permission};
use super::resolver::{effective_for, MemberDirectory};
use super::roles::BuiltinRole;
use crate::error::{ActionError, AdminResult};

/// Immutable per-request tenant context. Produced by the guard and
/// threaded explicitly through action calls; there is no ambient
/// "current server" state.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub organization_id: Uuid,
    pub slug: String,
    pub name: String,
    pub member_id: Uuid,
    pub user_id: Uuid,
    pub role: BuiltinRole,
    pub permissions: EffectivePermissions,
}

impl ServerContext {
    /// The caller's role list, as consumed by [`AccessRequirement`].
    #[must_use]
    pub fn roles(&self) -> [BuiltinRole; 1] {
        [self.role]
    }

    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.allows(permission)
    }
}

/// Guard over a membership directory.
pub struct ActionGuard<'a> {
    directory: &'a dyn MemberDirectory,
}

impl<'a> ActionGuard<'a> {
    pub fn new(directory: &'a dyn MemberDirectory) -> Self {
        Self { directory }
    }

    /// Authorize a caller against an organization and requirement.
    ///
    /// Rejection is a normal outcome path: unknown slug, missing
    /// membership and failed requirement each map to their own
    /// [`ActionError`]; nothing here is retried.
    pub async fn authorize(
        &self,
        slug: &str,
        user_id: Uuid,
        requirement: &AccessRequirement,
    ) -> AdminResult<ServerContext> {
        let organization = self
            .directory
            .organization_by_slug(slug)
            .await?
            .ok_or(ActionError::ServerNotFound)?;

        let membership = self
            .directory
            .membership(organization.id, user_id)
            .await?
            .ok_or(ActionError::NotAMember)?;

        let permissions = effective_for(&membership);

        if !requirement.permits(&[membership.role], &permissions) {
            warn!(
                server = %slug,
                user = %user_id,
                role = %membership.role,
                "rejected unauthorized action"
            );
            return Err(ActionError::Unauthorized.into());
        }

        Ok(ServerContext {
            organization_id: organization.id,
            slug: organization.slug,
            name: organization.name,
            member_id: membership.member_id,
            user_id,
            role: membership.role,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::PermissionRequirement;
    use crate::auth::testing::InMemoryDirectory;
    use crate::error::AdminError;

    fn admin_only() -> AccessRequirement {
        AccessRequirement::roles(vec![BuiltinRole::Admin, BuiltinRole::Owner])
    }

    #[tokio::test]
    async fn test_unknown_server_is_rejected() {
        let (mut directory, org) = InMemoryDirectory::new().with_organization("rp-city");
        let user = directory.add_member(org, BuiltinRole::Owner, None);

        let guard = ActionGuard::new(&directory);
        let err = guard
            .authorize("no-such-server", user, &admin_only())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Action(ActionError::ServerNotFound)));
    }

    #[tokio::test]
    async fn test_non_member_is_rejected_before_business_logic() {
        let (directory, _org) = InMemoryDirectory::new().with_organization("rp-city");

        let guard = ActionGuard::new(&directory);
        let err = guard
            .authorize("rp-city", Uuid::new_v4(), &AccessRequirement::none())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Action(ActionError::NotAMember)));
    }

    #[tokio::test]
    async fn test_role_requirement_rejects_plain_member() {
        let (mut directory, org) = InMemoryDirectory::new().with_organization("rp-city");
        let user = directory.add_member(org, BuiltinRole::Member, None);

        let guard = ActionGuard::new(&directory);
        let err = guard.authorize("rp-city", user, &admin_only()).await.unwrap_err();
        assert!(matches!(err, AdminError::Action(ActionError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_admin_passes_and_context_is_populated() {
        let (mut directory, org) = InMemoryDirectory::new().with_organization("rp-city");
        let user = directory.add_member(org, BuiltinRole::Admin, None);

        let guard = ActionGuard::new(&directory);
        let ctx = guard.authorize("rp-city", user, &admin_only()).await.unwrap();

        assert_eq!(ctx.organization_id, org);
        assert_eq!(ctx.slug, "rp-city");
        assert_eq!(ctx.role, BuiltinRole::Admin);
        assert!(ctx.permissions.is_all());
        assert!(ctx.can(Permission::ManageRoles));
    }

    #[tokio::test]
    async fn test_permission_requirement_grants_member_with_bag() {
        let (mut directory, org) = InMemoryDirectory::new().with_organization("rp-city");
        let user = directory.add_member(org, BuiltinRole::Member, Some(r#"{"EDIT_CITIZENS": true}"#));

        let guard = ActionGuard::new(&directory);
        let requirement =
            AccessRequirement::permissions(PermissionRequirement::any(vec![Permission::EditCitizens]));
        let ctx = guard.authorize("rp-city", user, &requirement).await.unwrap();

        assert!(ctx.can(Permission::EditCitizens));
        assert!(!ctx.can(Permission::ManageRoles));
    }
}
