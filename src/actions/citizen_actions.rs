//! Citizen record actions.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::validate_name;
use crate::auth::guard::ServerContext;
use crate::database::CitizenRepository;
use crate::error::{ActionError, AdminResult};
use crate::models::Citizen;

#[derive(Debug, Clone, Deserialize)]
pub struct CitizenInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CitizenActions {
    citizens: CitizenRepository,
}

impl CitizenActions {
    pub fn new(pool: PgPool) -> Self {
        Self {
            citizens: CitizenRepository::new(pool),
        }
    }

    pub async fn list_citizens(&self, ctx: &ServerContext) -> AdminResult<Vec<Citizen>> {
        Ok(self.citizens.list_citizens(ctx.organization_id).await?)
    }

    pub async fn get_citizen(
        &self,
        ctx: &ServerContext,
        citizen_id: Uuid,
    ) -> AdminResult<Citizen> {
        self.citizens
            .find_citizen(ctx.organization_id, citizen_id)
            .await?
            .ok_or_else(|| ActionError::CitizenNotFound.into())
    }

    pub async fn create_citizen(
        &self,
        ctx: &ServerContext,
        input: CitizenInput,
    ) -> AdminResult<Citizen> {
        let first_name = validate_name("First name", &input.first_name)?;
        let last_name = validate_name("Last name", &input.last_name)?;

        let citizen = self
            .citizens
            .create_citizen(
                ctx.organization_id,
                &first_name,
                &last_name,
                input.date_of_birth,
                input.address.as_deref(),
                input.phone.as_deref(),
                input.notes.as_deref(),
                ctx.member_id,
            )
            .await?;

        info!(server = %ctx.slug, citizen = %citizen.id, "created citizen");
        Ok(citizen)
    }

    pub async fn update_citizen(
        &self,
        ctx: &ServerContext,
        citizen_id: Uuid,
        input: CitizenInput,
    ) -> AdminResult<Citizen> {
        let first_name = validate_name("First name", &input.first_name)?;
        let last_name = validate_name("Last name", &input.last_name)?;

        let citizen = self
            .citizens
            .update_citizen(
                ctx.organization_id,
                citizen_id,
                &first_name,
                &last_name,
                input.date_of_birth,
                input.address.as_deref(),
                input.phone.as_deref(),
                input.notes.as_deref(),
            )
            .await?
            .ok_or(ActionError::CitizenNotFound)?;

        info!(server = %ctx.slug, citizen = %citizen.id, "updated citizen");
        Ok(citizen)
    }

    pub async fn delete_citizen(
        &self,
        ctx: &ServerContext,
        citizen_id: Uuid,
    ) -> AdminResult<()> {
        let deleted = self
            .citizens
            .delete_citizen(ctx.organization_id, citizen_id)
            .await?;

        if !deleted {
            return Err(ActionError::CitizenNotFound.into());
        }

        info!(server = %ctx.slug, citizen = %citizen_id, "deleted citizen");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citizen_input_deserializes_with_optional_fields() {
        let input: CitizenInput = serde_json::from_str(
            r#"{"first_name": "John", "last_name": "Doe", "date_of_birth": "1990-04-12"}"#,
        )
        .unwrap();
        assert_eq!(input.first_name, "John");
        assert_eq!(
            input.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 4, 12)
        );
        assert!(input.address.is_none());
    }
}
