//! Authorization: built-in roles, the permission catalog, effective
//! permission resolution and the server-action guard.
//!
//! The central type is [`permissions::AccessRequirement`]: the single
//! predicate evaluated by both navigation filtering and the action guard,
//! so a link is visible exactly when the operation behind it is allowed.

pub mod guard;
pub mod permissions;
pub mod resolver;
pub mod roles;

pub use guard::{ActionGuard, ServerContext};
pub use permissions::{
    AccessRequirement, EffectivePermissions, Permission, PermissionRequirement, PermissionSet,
    RequireMode,
};
pub use resolver::{resolve_permissions, MemberDirectory};
pub use roles::{is_in_roles, BuiltinRole};

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`MemberDirectory`] used by resolver and guard tests.

    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::resolver::MemberDirectory;
    use super::roles::BuiltinRole;
    use crate::error::AdminResult;
    use crate::models::{MembershipRecord, Organization};

    #[derive(Default)]
    pub struct InMemoryDirectory {
        organizations: Vec<Organization>,
        memberships: HashMap<(Uuid, Uuid), MembershipRecord>,
    }

    impl InMemoryDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_organization(mut self, slug: &str) -> (Self, Uuid) {
            let id = Uuid::new_v4();
            self.organizations.push(Organization {
                id,
                name: slug.to_string(),
                slug: slug.to_string(),
                logo: None,
                created_at: Utc::now(),
            });
            (self, id)
        }

        pub fn add_member(
            &mut self,
            organization_id: Uuid,
            role: BuiltinRole,
            permission_bag: Option<&str>,
        ) -> Uuid {
            let user_id = Uuid::new_v4();
            self.memberships.insert(
                (organization_id, user_id),
                MembershipRecord {
                    member_id: Uuid::new_v4(),
                    role,
                    custom_role_id: permission_bag.map(|_| Uuid::new_v4()),
                    permission_bag: permission_bag.map(String::from),
                },
            );
            user_id
        }
    }

    #[async_trait]
    impl MemberDirectory for InMemoryDirectory {
        async fn organization_by_slug(&self, slug: &str) -> AdminResult<Option<Organization>> {
            Ok(self.organizations.iter().find(|o| o.slug == slug).cloned())
        }

        async fn membership(
            &self,
            organization_id: Uuid,
            user_id: Uuid,
        ) -> AdminResult<Option<MembershipRecord>> {
            Ok(self.memberships.get(&(organization_id, user_id)).cloned())
        }
    }
}
