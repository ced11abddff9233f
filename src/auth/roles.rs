//! Built-in organization roles.
//!
//! Three roles exist: `member`, `admin`, `owner`. Privilege ordering
//! (owner over admin over member) is implicit; the only structural rule
//! is the permission bypass for `admin` and `owner`.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Built-in role of a member, stored as lowercase text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
pub enum BuiltinRole {
    Member,
    Admin,
    Owner,
}

impl BuiltinRole {
    /// `admin` and `owner` implicitly satisfy every permission check,
    /// regardless of custom-role contents.
    #[must_use]
    pub fn bypasses_permissions(&self) -> bool {
        matches!(self, BuiltinRole::Admin | BuiltinRole::Owner)
    }
}

impl std::fmt::Display for BuiltinRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// True iff the user holds at least one of the required roles. Empty
/// user roles never match.
#[must_use]
pub fn is_in_roles(user_roles: &[BuiltinRole], required: &[BuiltinRole]) -> bool {
    if user_roles.is_empty() {
        return false;
    }
    user_roles.iter().any(|role| required.contains(role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_codec() {
        assert_eq!(BuiltinRole::Owner.as_ref(), "owner");
        assert_eq!("admin".parse::<BuiltinRole>().unwrap(), BuiltinRole::Admin);
        assert!("superuser".parse::<BuiltinRole>().is_err());
    }

    #[test]
    fn test_bypass_roles() {
        assert!(BuiltinRole::Owner.bypasses_permissions());
        assert!(BuiltinRole::Admin.bypasses_permissions());
        assert!(!BuiltinRole::Member.bypasses_permissions());
    }

    #[test]
    fn test_is_in_roles_intersection() {
        let user = [BuiltinRole::Member];
        assert!(is_in_roles(&user, &[BuiltinRole::Member, BuiltinRole::Admin]));
        assert!(!is_in_roles(&user, &[BuiltinRole::Admin, BuiltinRole::Owner]));
    }

    #[test]
    fn test_is_in_roles_empty_user_roles() {
        assert!(!is_in_roles(&[], &[BuiltinRole::Member]));
    }
}
