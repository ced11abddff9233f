//! Member management actions.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::guard::ServerContext;
use crate::auth::roles::BuiltinRole;
use crate::database::MemberRepository;
use crate::error::{ActionError, AdminResult};
use crate::models::MemberWithProfile;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRoleInput {
    pub role: BuiltinRole,
}

#[derive(Clone, Debug)]
pub struct MemberActions {
    members: MemberRepository,
}

impl MemberActions {
    pub fn new(pool: PgPool) -> Self {
        Self {
            members: MemberRepository::new(pool),
        }
    }

    /// Members of the caller's server, optionally filtered by a
    /// case-insensitive name/email query.
    pub async fn list_members(
        &self,
        ctx: &ServerContext,
        query: Option<&str>,
    ) -> AdminResult<Vec<MemberWithProfile>> {
        Ok(self
            .members
            .list_members(ctx.organization_id, query)
            .await?)
    }

    /// Change a member's built-in role. A server must keep at least one
    /// owner, so demoting the last owner is rejected.
    pub async fn update_member_role(
        &self,
        ctx: &ServerContext,
        member_id: Uuid,
        input: UpdateMemberRoleInput,
    ) -> AdminResult<()> {
        let member = self
            .members
            .member_by_id(ctx.organization_id, member_id)
            .await?
            .ok_or(ActionError::MemberNotFound)?;

        if member.role == BuiltinRole::Owner && input.role != BuiltinRole::Owner {
            let owners = self.members.count_owners(ctx.organization_id).await?;
            if owners <= 1 {
                return Err(ActionError::LastOwner.into());
            }
        }

        self.members.update_builtin_role(member.id, input.role).await?;

        info!(
            server = %ctx.slug,
            member = %member.id,
            from = %member.role,
            to = %input.role,
            "changed built-in role"
        );
        Ok(())
    }
}
