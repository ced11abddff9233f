//! Error handling for the administration backend.
//!
//! Errors are two-tier: expected domain rejections ([`ActionError`]) carry
//! a user-safe message and surface verbatim to the caller; everything else
//! is wrapped by [`AdminError`] and collapses to a generic message at the
//! HTTP boundary after being logged server-side.

use thiserror::Error;

/// Expected rejection of an action. Every variant's message is safe to
/// show to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("You need to be part of a server to access this resource.")]
    NotAMember,

    #[error("Server not found")]
    ServerNotFound,

    #[error("You are not allowed to perform this action.")]
    Unauthorized,

    #[error("Role not found")]
    RoleNotFound,

    #[error("Department not found")]
    DepartmentNotFound,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Member not found or not in this role")]
    MemberNotInRole,

    #[error("Citizen not found")]
    CitizenNotFound,

    #[error("Some members do not belong to this server")]
    MembersOutsideServer,

    #[error("A server must keep at least one owner")]
    LastOwner,

    #[error("{0}")]
    Validation(String),
}

impl ActionError {
    /// Validation rejection with a formatted message.
    pub fn validation(message: impl Into<String>) -> Self {
        ActionError::Validation(message.into())
    }
}

/// Top-level error type. [`ActionError`] is the expected-rejection tier;
/// the remaining variants are infrastructure failures that must never
/// leak internals to the caller.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdminError {
    /// True for the expected-rejection tier.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AdminError::Action(_))
    }

    /// Message safe to show to the caller. Expected rejections surface
    /// verbatim; infrastructure failures collapse to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            AdminError::Action(action) => action.to_string(),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

/// Result type aliases for convenience
pub type AdminResult<T> = Result<T, AdminError>;
pub type ActionResult<T> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_surfaces_verbatim() {
        let err = AdminError::from(ActionError::RoleNotFound);
        assert!(err.is_rejection());
        assert_eq!(err.user_message(), "Role not found");
    }

    #[test]
    fn test_infrastructure_error_collapses() {
        let err = AdminError::from(sqlx::Error::PoolClosed);
        assert!(!err.is_rejection());
        assert_eq!(err.user_message(), "An unexpected error occurred.");
    }

    #[test]
    fn test_validation_message() {
        let err = ActionError::validation("Role name is required");
        assert_eq!(err.to_string(), "Role name is required");
    }
}
