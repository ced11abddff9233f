//! Role, department and role-membership actions.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use super::validate_name;
use crate::auth::guard::ServerContext;
use crate::auth::permissions::{Permission, PermissionSet};
use crate::database::{MemberRepository, RoleRepository};
use crate::error::{ActionError, ActionResult, AdminResult};
use crate::models::{CustomRole, Department, MemberWithProfile};

// ============================================================================
// Inputs
// ============================================================================

/// Role payload. `permissions` arrives as the editor's key → granted map;
/// unknown keys are rejected on write (reads stay lenient).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleInput {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub permissions: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoleInput {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub permissions: BTreeMap<String, bool>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMembersInput {
    pub role_id: Uuid,
    pub member_user_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartmentInput {
    pub name: String,
}

/// Outcome of a bulk assignment. Partial success is possible; only the
/// success count is reported.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAssignment {
    pub count: usize,
}

fn permission_set_from_input(map: &BTreeMap<String, bool>) -> ActionResult<PermissionSet> {
    let mut set = PermissionSet::new();
    for (key, granted) in map {
        let permission = key
            .parse::<Permission>()
            .map_err(|_| ActionError::validation(format!("Unknown permission: {key}")))?;
        if *granted {
            set.insert(permission);
        }
    }
    Ok(set)
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone, Debug)]
pub struct RoleActions {
    roles: RoleRepository,
    members: MemberRepository,
}

impl RoleActions {
    pub fn new(pool: PgPool) -> Self {
        Self {
            roles: RoleRepository::new(pool.clone()),
            members: MemberRepository::new(pool),
        }
    }

    pub async fn list_roles(&self, ctx: &ServerContext) -> AdminResult<Vec<CustomRole>> {
        Ok(self.roles.list_roles(ctx.organization_id).await?)
    }

    pub async fn create_role(
        &self,
        ctx: &ServerContext,
        input: CreateRoleInput,
    ) -> AdminResult<CustomRole> {
        let name = validate_name("Role name", &input.name)?;
        let color = validate_name("Role color", &input.color)?;
        let permissions = permission_set_from_input(&input.permissions)?;

        let role = self
            .roles
            .create_role(ctx.organization_id, &name, &color, &permissions.to_bag_json())
            .await?;

        info!(server = %ctx.slug, role = %role.id, position = role.position, "created role");
        Ok(role)
    }

    pub async fn update_role(
        &self,
        ctx: &ServerContext,
        role_id: Uuid,
        input: UpdateRoleInput,
    ) -> AdminResult<CustomRole> {
        let name = validate_name("Role name", &input.name)?;
        let color = validate_name("Role color", &input.color)?;
        let permissions = permission_set_from_input(&input.permissions)?;

        if let Some(department_id) = input.department_id {
            self.roles
                .find_department(ctx.organization_id, department_id)
                .await?
                .ok_or(ActionError::DepartmentNotFound)?;
        }

        let role = self
            .roles
            .update_role(
                ctx.organization_id,
                role_id,
                &name,
                &color,
                &permissions.to_bag_json(),
                input.department_id,
            )
            .await?
            .ok_or(ActionError::RoleNotFound)?;

        info!(server = %ctx.slug, role = %role.id, "updated role");
        Ok(role)
    }

    /// Delete a role. Members still assigned have their reference
    /// cleared first, so no dangling assignment survives the delete.
    pub async fn delete_role(&self, ctx: &ServerContext, role_id: Uuid) -> AdminResult<u64> {
        let role = self
            .roles
            .find_role(ctx.organization_id, role_id)
            .await?
            .ok_or(ActionError::RoleNotFound)?;

        let cleared = self.roles.clear_role_assignments(role.id).await?;
        self.roles.delete_role(role.id).await?;

        info!(server = %ctx.slug, role = %role.id, cleared_members = cleared, "deleted role");
        Ok(cleared)
    }

    /// Assign a role to a batch of members. All targets must belong to
    /// the organization; updates then fan out concurrently with no
    /// rollback coordination, so a subset may fail.
    pub async fn add_members_to_role(
        &self,
        ctx: &ServerContext,
        input: AddMembersInput,
    ) -> AdminResult<BulkAssignment> {
        let role = self
            .roles
            .find_role(ctx.organization_id, input.role_id)
            .await?
            .ok_or(ActionError::RoleNotFound)?;

        let members = self
            .members
            .members_by_user_ids(ctx.organization_id, &input.member_user_ids)
            .await?;

        if members.len() != input.member_user_ids.len() {
            return Err(ActionError::MembersOutsideServer.into());
        }

        let results = join_all(
            members
                .iter()
                .map(|member| self.members.assign_custom_role(member.id, role.id)),
        )
        .await;

        let count = results.iter().filter(|r| r.is_ok()).count();
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            error!(server = %ctx.slug, role = %role.id, "failed to assign role: {}", err);
        }

        info!(
            server = %ctx.slug,
            role = %role.id,
            requested = input.member_user_ids.len(),
            assigned = count,
            "bulk role assignment"
        );
        Ok(BulkAssignment { count })
    }

    pub async fn remove_member_from_role(
        &self,
        ctx: &ServerContext,
        role_id: Uuid,
        member_id: Uuid,
    ) -> AdminResult<()> {
        self.roles
            .find_role(ctx.organization_id, role_id)
            .await?
            .ok_or(ActionError::RoleNotFound)?;

        let removed = self
            .members
            .clear_custom_role(ctx.organization_id, member_id, role_id)
            .await?;

        if !removed {
            return Err(ActionError::MemberNotInRole.into());
        }

        info!(server = %ctx.slug, role = %role_id, member = %member_id, "removed member from role");
        Ok(())
    }

    pub async fn members_of_role(
        &self,
        ctx: &ServerContext,
        role_id: Uuid,
    ) -> AdminResult<Vec<MemberWithProfile>> {
        self.roles
            .find_role(ctx.organization_id, role_id)
            .await?
            .ok_or(ActionError::RoleNotFound)?;

        Ok(self
            .members
            .members_of_role(ctx.organization_id, role_id)
            .await?)
    }

    // ------------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------------

    pub async fn create_department(
        &self,
        ctx: &ServerContext,
        input: CreateDepartmentInput,
    ) -> AdminResult<Department> {
        let name = validate_name("Department name", &input.name)?;
        let department = self
            .roles
            .create_department(ctx.organization_id, &name)
            .await?;

        info!(server = %ctx.slug, department = %department.id, "created department");
        Ok(department)
    }

    pub async fn list_departments(&self, ctx: &ServerContext) -> AdminResult<Vec<Department>> {
        Ok(self.roles.list_departments(ctx.organization_id).await?)
    }

    /// Delete a department. Roles referencing it keep existing with the
    /// reference nulled; returns how many were touched.
    pub async fn delete_department(
        &self,
        ctx: &ServerContext,
        department_id: Uuid,
    ) -> AdminResult<u64> {
        let department = self
            .roles
            .find_department(ctx.organization_id, department_id)
            .await?
            .ok_or(ActionError::DepartmentNotFound)?;

        let cleared = self.roles.clear_department_references(department.id).await?;
        self.roles.delete_department(department.id).await?;

        info!(
            server = %ctx.slug,
            department = %department.id,
            cleared_roles = cleared,
            "deleted department"
        );
        Ok(cleared)
    }
}
