//! Mutation entry points.
//!
//! Every action takes the guard-produced [`crate::auth::ServerContext`]
//! plus a validated input. The access each entry point requires is
//! declared here as data, next to the services that implement it; the
//! HTTP layer hands the declaration to the guard before calling in.

pub mod citizen_actions;
pub mod member_actions;
pub mod role_actions;

pub use citizen_actions::CitizenActions;
pub use member_actions::MemberActions;
pub use role_actions::RoleActions;

use crate::auth::permissions::{AccessRequirement, Permission, PermissionRequirement};
use crate::auth::roles::BuiltinRole;
use crate::error::{ActionError, ActionResult};

/// Longest accepted name for roles, departments and citizen name parts.
pub const MAX_NAME_LEN: usize = 100;

/// Role, department and bulk-assignment management.
#[must_use]
pub fn role_management_access() -> AccessRequirement {
    AccessRequirement::roles(vec![BuiltinRole::Owner, BuiltinRole::Admin])
}

/// Built-in role changes on members.
#[must_use]
pub fn owner_only_access() -> AccessRequirement {
    AccessRequirement::roles(vec![BuiltinRole::Owner])
}

/// Any member of the server.
#[must_use]
pub fn member_access() -> AccessRequirement {
    AccessRequirement::none()
}

/// Reading citizens mirrors the citizens route rule.
#[must_use]
pub fn citizen_read_access() -> AccessRequirement {
    AccessRequirement::permissions(PermissionRequirement::any(vec![
        Permission::EditCitizens,
        Permission::CreateCitizens,
    ]))
}

#[must_use]
pub fn citizen_create_access() -> AccessRequirement {
    AccessRequirement::permissions(PermissionRequirement::any(vec![Permission::CreateCitizens]))
}

#[must_use]
pub fn citizen_edit_access() -> AccessRequirement {
    AccessRequirement::permissions(PermissionRequirement::any(vec![Permission::EditCitizens]))
}

/// Validate a required name field: trimmed, non-empty, bounded.
pub(crate) fn validate_name(field: &str, value: &str) -> ActionResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActionError::validation(format!("{field} is required")));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(ActionError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("Role name", "  Dispatch ").unwrap(), "Dispatch");
    }

    #[test]
    fn test_validate_name_rejects_empty() {
        let err = validate_name("Role name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Role name is required");
    }

    #[test]
    fn test_validate_name_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name("Name", &long).is_err());
    }
}
