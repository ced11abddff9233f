//! Citizen record persistence.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Citizen;

const CITIZEN_COLUMNS: &str = r#"id, organization_id, first_name, last_name, date_of_birth,
                   address, phone, notes, created_by, created_at, updated_at"#;

#[derive(Clone, Debug)]
pub struct CitizenRepository {
    pool: PgPool,
}

impl CitizenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_citizens(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Citizen>, sqlx::Error> {
        sqlx::query_as::<_, Citizen>(&format!(
            r#"
            SELECT {CITIZEN_COLUMNS}
            FROM "mdt".citizens
            WHERE organization_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_citizen(
        &self,
        organization_id: Uuid,
        citizen_id: Uuid,
    ) -> Result<Option<Citizen>, sqlx::Error> {
        sqlx::query_as::<_, Citizen>(&format!(
            r#"
            SELECT {CITIZEN_COLUMNS}
            FROM "mdt".citizens
            WHERE id = $1 AND organization_id = $2
            "#
        ))
        .bind(citizen_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_citizen(
        &self,
        organization_id: Uuid,
        first_name: &str,
        last_name: &str,
        date_of_birth: Option<NaiveDate>,
        address: Option<&str>,
        phone: Option<&str>,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Citizen, sqlx::Error> {
        sqlx::query_as::<_, Citizen>(&format!(
            r#"
            INSERT INTO "mdt".citizens
                (id, organization_id, first_name, last_name, date_of_birth,
                 address, phone, notes, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
            RETURNING {CITIZEN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(first_name)
        .bind(last_name)
        .bind(date_of_birth)
        .bind(address)
        .bind(phone)
        .bind(notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
    }

    /// Scoped full update; `None` when the citizen is not in the
    /// organization.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_citizen(
        &self,
        organization_id: Uuid,
        citizen_id: Uuid,
        first_name: &str,
        last_name: &str,
        date_of_birth: Option<NaiveDate>,
        address: Option<&str>,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Option<Citizen>, sqlx::Error> {
        sqlx::query_as::<_, Citizen>(&format!(
            r#"
            UPDATE "mdt".citizens
            SET first_name = $3, last_name = $4, date_of_birth = $5,
                address = $6, phone = $7, notes = $8, updated_at = now()
            WHERE id = $1 AND organization_id = $2
            RETURNING {CITIZEN_COLUMNS}
            "#
        ))
        .bind(citizen_id)
        .bind(organization_id)
        .bind(first_name)
        .bind(last_name)
        .bind(date_of_birth)
        .bind(address)
        .bind(phone)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await
    }

    /// Scoped delete; returns whether a row was removed.
    pub async fn delete_citizen(
        &self,
        organization_id: Uuid,
        citizen_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM "mdt".citizens
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(citizen_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
