//! Custom role and department persistence.
//!
//! Permission bags cross this boundary as JSON text; callers hand in the
//! serialized bag and decode through the typed set on the way out.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CustomRole, Department};

const ROLE_COLUMNS: &str = r#"id, organization_id, name, color, "position" AS position,
                   department_id, permissions, created_at, updated_at"#;

#[derive(Clone, Debug)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------------

    pub async fn list_roles(&self, organization_id: Uuid) -> Result<Vec<CustomRole>, sqlx::Error> {
        sqlx::query_as::<_, CustomRole>(&format!(
            r#"
            SELECT {ROLE_COLUMNS}
            FROM "mdt".custom_roles
            WHERE organization_id = $1
            ORDER BY "position" ASC
            "#
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Role lookup scoped to an organization; cross-tenant ids come back
    /// as `None`.
    pub async fn find_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<CustomRole>, sqlx::Error> {
        sqlx::query_as::<_, CustomRole>(&format!(
            r#"
            SELECT {ROLE_COLUMNS}
            FROM "mdt".custom_roles
            WHERE id = $1 AND organization_id = $2
            "#
        ))
        .bind(role_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create a role at the next ordering position: 0 for the first role
    /// of an organization, max + 1 afterwards.
    pub async fn create_role(
        &self,
        organization_id: Uuid,
        name: &str,
        color: &str,
        permission_bag: &str,
    ) -> Result<CustomRole, sqlx::Error> {
        let position: i32 = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT COALESCE(MAX("position") + 1, 0)
            FROM "mdt".custom_roles
            WHERE organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query_as::<_, CustomRole>(&format!(
            r#"
            INSERT INTO "mdt".custom_roles
                (id, organization_id, name, color, "position", permissions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(name)
        .bind(color)
        .bind(position)
        .bind(permission_bag)
        .fetch_one(&self.pool)
        .await
    }

    /// Scoped update; returns `None` when the role does not belong to the
    /// organization.
    pub async fn update_role(
        &self,
        organization_id: Uuid,
        role_id: Uuid,
        name: &str,
        color: &str,
        permission_bag: &str,
        department_id: Option<Uuid>,
    ) -> Result<Option<CustomRole>, sqlx::Error> {
        sqlx::query_as::<_, CustomRole>(&format!(
            r#"
            UPDATE "mdt".custom_roles
            SET name = $3, color = $4, permissions = $5, department_id = $6,
                updated_at = now()
            WHERE id = $1 AND organization_id = $2
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(role_id)
        .bind(organization_id)
        .bind(name)
        .bind(color)
        .bind(permission_bag)
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Clear every member assignment pointing at a role. Returns the
    /// number of members affected.
    pub async fn clear_role_assignments(&self, role_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "mdt".members
            SET custom_role_id = NULL
            WHERE custom_role_id = $1
            "#,
        )
        .bind(role_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_role(&self, role_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(r#"DELETE FROM "mdt".custom_roles WHERE id = $1"#)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------------

    pub async fn create_department(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> Result<Department, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO "mdt".departments (id, organization_id, name, created_at)
            VALUES ($1, $2, $3, now())
            RETURNING id, organization_id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_departments(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Department>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT id, organization_id, name, created_at
            FROM "mdt".departments
            WHERE organization_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_department(
        &self,
        organization_id: Uuid,
        department_id: Uuid,
    ) -> Result<Option<Department>, sqlx::Error> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT id, organization_id, name, created_at
            FROM "mdt".departments
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(department_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Null the department reference on every role pointing at it.
    /// Returns the number of roles touched; no role is deleted.
    pub async fn clear_department_references(
        &self,
        department_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE "mdt".custom_roles
            SET department_id = NULL, updated_at = now()
            WHERE department_id = $1
            "#,
        )
        .bind(department_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_department(&self, department_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(r#"DELETE FROM "mdt".departments WHERE id = $1"#)
            .bind(department_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
