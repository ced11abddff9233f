//! Member lookups and assignment updates.
//!
//! Also implements [`MemberDirectory`], the read seam the resolver and
//! guard run against.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::resolver::MemberDirectory;
use crate::auth::roles::BuiltinRole;
use crate::error::AdminResult;
use crate::models::{Member, MembershipRecord, MemberWithProfile, Organization};

/// Cap on role member listings, matching the role editor's page size.
const ROLE_MEMBER_LIMIT: i64 = 50;

#[derive(Clone, Debug)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Membership of one user in one organization, joined with the
    /// assigned custom role's permission bag.
    pub async fn find_membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MembershipRecord>, sqlx::Error> {
        sqlx::query_as::<_, MembershipRecord>(
            r#"
            SELECT m.id AS member_id, m.role, m.custom_role_id,
                   r.permissions AS permission_bag
            FROM "mdt".members m
            LEFT JOIN "mdt".custom_roles r ON r.id = m.custom_role_id
            WHERE m.organization_id = $1 AND m.user_id = $2
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn member_by_id(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            r#"
            SELECT id, organization_id, user_id, role, custom_role_id, created_at
            FROM "mdt".members
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(member_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Members of an organization with user display columns. An optional
    /// query filters on name or email, case-insensitively.
    pub async fn list_members(
        &self,
        organization_id: Uuid,
        query: Option<&str>,
    ) -> Result<Vec<MemberWithProfile>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithProfile>(
            r#"
            SELECT m.id, m.user_id, m.role, m.custom_role_id,
                   u.name, u.email, u.image, m.created_at
            FROM "mdt".members m
            JOIN "mdt".users u ON u.id = m.user_id
            WHERE m.organization_id = $1
              AND ($2::text IS NULL
                   OR u.name ILIKE '%' || $2 || '%'
                   OR u.email ILIKE '%' || $2 || '%')
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(organization_id)
        .bind(query)
        .fetch_all(&self.pool)
        .await
    }

    /// Organization members matching the given user ids.
    pub async fn members_by_user_ids(
        &self,
        organization_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<Vec<Member>, sqlx::Error> {
        sqlx::query_as::<_, Member>(
            r#"
            SELECT id, organization_id, user_id, role, custom_role_id, created_at
            FROM "mdt".members
            WHERE organization_id = $1 AND user_id = ANY($2)
            "#,
        )
        .bind(organization_id)
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
    }

    /// Members currently assigned to a custom role, capped at the role
    /// editor's page size.
    pub async fn members_of_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
    ) -> Result<Vec<MemberWithProfile>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithProfile>(
            r#"
            SELECT m.id, m.user_id, m.role, m.custom_role_id,
                   u.name, u.email, u.image, m.created_at
            FROM "mdt".members m
            JOIN "mdt".users u ON u.id = m.user_id
            WHERE m.organization_id = $1 AND m.custom_role_id = $2
            ORDER BY m.created_at ASC
            LIMIT $3
            "#,
        )
        .bind(organization_id)
        .bind(role_id)
        .bind(ROLE_MEMBER_LIMIT)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn assign_custom_role(
        &self,
        member_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE "mdt".members
            SET custom_role_id = $2
            WHERE id = $1
            "#,
        )
        .bind(member_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Clear a member's custom role, scoped to the organization and the
    /// expected role. Returns whether a row was updated.
    pub async fn clear_custom_role(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
        role_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "mdt".members
            SET custom_role_id = NULL
            WHERE id = $1 AND organization_id = $2 AND custom_role_id = $3
            "#,
        )
        .bind(member_id)
        .bind(organization_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_builtin_role(
        &self,
        member_id: Uuid,
        role: BuiltinRole,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE "mdt".members
            SET role = $2
            WHERE id = $1
            "#,
        )
        .bind(member_id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn count_owners(&self, organization_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM "mdt".members
            WHERE organization_id = $1 AND role = 'owner'
            "#,
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
    }
}

#[async_trait]
impl MemberDirectory for MemberRepository {
    async fn organization_by_slug(&self, slug: &str) -> AdminResult<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, slug, logo, created_at
            FROM "mdt".organizations
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(organization)
    }

    async fn membership(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> AdminResult<Option<MembershipRecord>> {
        Ok(self.find_membership(organization_id, user_id).await?)
    }
}
