//! Persisted row types for the `mdt` schema.
//!
//! Organizations are the tenant unit; product language calls them
//! "servers". Users are owned by the upstream identity provider and only
//! their display columns are read here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::permissions::PermissionSet;
use crate::auth::roles::BuiltinRole;

/// Tenant unit ("server" in product language).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Membership of one user in one organization. The built-in `role` is
/// independent of and additive to any custom-role permissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: BuiltinRole,
    pub custom_role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Member row joined with the user's display columns, for listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MemberWithProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: BuiltinRole,
    pub custom_role_id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Membership joined with the assigned custom role's permission bag.
/// This is the single read the permission resolver performs.
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRecord {
    pub member_id: Uuid,
    pub role: BuiltinRole,
    pub custom_role_id: Option<Uuid>,
    pub permission_bag: Option<String>,
}

/// Tenant-defined role. `permissions` is the JSON-encoded bag as stored;
/// decode through [`CustomRole::permission_set`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomRole {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub color: String,
    pub position: i32,
    pub department_id: Option<Uuid>,
    pub permissions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomRole {
    /// Decode the stored permission bag. Malformed bags degrade to the
    /// empty set (logged), they never fail the read.
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_bag_json(&self.permissions)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Citizen record, the representative permission-gated data type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Citizen {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::Permission;

    #[test]
    fn test_custom_role_decodes_its_bag() {
        let role = CustomRole {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "Dispatch".to_string(),
            color: "#f97316".to_string(),
            position: 0,
            department_id: None,
            permissions: r#"{"MANAGE_CALLS": true, "VIEW_DISPATCH": true}"#.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let set = role.permission_set();
        assert!(set.contains(Permission::ManageCalls));
        assert_eq!(set.len(), 2);
    }
}
