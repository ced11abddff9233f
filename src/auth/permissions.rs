//! Permission catalog, permission sets and access requirements.
//!
//! Permissions are a fixed catalog of identifiers serialized as
//! SCREAMING_SNAKE_CASE strings. Tenants grant them through custom-role
//! permission bags stored as JSON text; decoding is lenient at the
//! storage boundary and everything in-process goes through the typed
//! [`PermissionSet`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, error};

use super::roles::{is_in_roles, BuiltinRole};

// ============================================================================
// Catalog
// ============================================================================

/// Permission identifiers. Declaration order is catalog order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    // General
    ViewDashboard,
    ManageServer,
    ManageRoles,
    ViewAuditLog,
    EditServerSettings,
    // Members
    ViewMembers,
    ManageMembers,
    ManageUsers,
    KickMembers,
    BanMembers,
    // LEO
    ViewLeo,
    ManageLeo,
    CreateArrestReports,
    CreateBolos,
    NameSearch,
    PlateSearch,
    WeaponSearch,
    ManageWarrants,
    // EMS/FD
    ViewEms,
    ManageEms,
    CreateMedicalRecords,
    DeclareDead,
    // Dispatch
    ViewDispatch,
    ManageDispatch,
    ManageCalls,
    UpdateAop,
    UseSignal100,
    // Citizen
    CreateCitizens,
    EditCitizens,
    RegisterVehicles,
    RegisterWeapons,
    CreateCompanies,
    // Advanced
    Administrator,
}

impl Permission {
    /// Short description shown next to the permission in role editors.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "View the server dashboard",
            Permission::ManageServer => "Change server-wide settings",
            Permission::ManageRoles => "Create, edit and delete roles",
            Permission::ViewAuditLog => "See who performed which actions on the server",
            Permission::EditServerSettings => "Edit the server settings pages",
            Permission::ViewMembers => "See the member list",
            Permission::ManageMembers => "Manage server members",
            Permission::ManageUsers => "Manage user accounts on the server",
            Permission::KickMembers => "Kick members from the server",
            Permission::BanMembers => "Ban members from the server",
            Permission::ViewLeo => "View officers",
            Permission::ManageLeo => "Manage officers",
            Permission::CreateArrestReports => "Create arrest reports",
            Permission::CreateBolos => "Create BOLO notices",
            Permission::NameSearch => "Search citizens by name",
            Permission::PlateSearch => "Search vehicles by plate",
            Permission::WeaponSearch => "Search registered weapons",
            Permission::ManageWarrants => "Manage warrants",
            Permission::ViewEms => "View EMS/FD",
            Permission::ManageEms => "Manage EMS/FD",
            Permission::CreateMedicalRecords => "Create medical records",
            Permission::DeclareDead => "Declare a citizen deceased",
            Permission::ViewDispatch => "View dispatch",
            Permission::ManageDispatch => "Manage dispatch",
            Permission::ManageCalls => "Manage calls",
            Permission::UpdateAop => "Update the area of play",
            Permission::UseSignal100 => "Toggle Signal 100",
            Permission::CreateCitizens => "Create citizen profiles",
            Permission::EditCitizens => "Edit existing citizens",
            Permission::RegisterVehicles => "Register vehicles",
            Permission::RegisterWeapons => "Register weapons",
            Permission::CreateCompanies => "Create companies",
            Permission::Administrator => {
                "Members with this permission have every right on the server"
            }
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Category grouping for role editors.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PermissionCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub permissions: &'static [Permission],
}

/// The fixed permission catalog, grouped by category.
#[must_use]
pub fn permission_catalog() -> &'static [PermissionCategory] {
    CATALOG
}

const CATALOG: &[PermissionCategory] = &[
    PermissionCategory {
        id: "general",
        name: "General",
        permissions: &[
            Permission::ViewDashboard,
            Permission::ManageServer,
            Permission::ManageRoles,
            Permission::ViewAuditLog,
            Permission::EditServerSettings,
        ],
    },
    PermissionCategory {
        id: "members",
        name: "Members",
        permissions: &[
            Permission::ViewMembers,
            Permission::ManageMembers,
            Permission::ManageUsers,
            Permission::KickMembers,
            Permission::BanMembers,
        ],
    },
    PermissionCategory {
        id: "leo",
        name: "LEO",
        permissions: &[
            Permission::ViewLeo,
            Permission::ManageLeo,
            Permission::CreateArrestReports,
            Permission::CreateBolos,
            Permission::NameSearch,
            Permission::PlateSearch,
            Permission::WeaponSearch,
            Permission::ManageWarrants,
        ],
    },
    PermissionCategory {
        id: "ems",
        name: "EMS/FD",
        permissions: &[
            Permission::ViewEms,
            Permission::ManageEms,
            Permission::CreateMedicalRecords,
            Permission::DeclareDead,
        ],
    },
    PermissionCategory {
        id: "dispatch",
        name: "Dispatch",
        permissions: &[
            Permission::ViewDispatch,
            Permission::ManageDispatch,
            Permission::ManageCalls,
            Permission::UpdateAop,
            Permission::UseSignal100,
        ],
    },
    PermissionCategory {
        id: "citizen",
        name: "Citizen",
        permissions: &[
            Permission::CreateCitizens,
            Permission::EditCitizens,
            Permission::RegisterVehicles,
            Permission::RegisterWeapons,
            Permission::CreateCompanies,
        ],
    },
    PermissionCategory {
        id: "advanced",
        name: "Advanced",
        permissions: &[Permission::Administrator],
    },
];

// ============================================================================
// Permission sets
// ============================================================================

/// Ordered set of granted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a stored JSON permission bag.
    ///
    /// Lenient by contract: malformed JSON yields the empty set and logs
    /// an error; unknown keys are skipped; only entries with value `true`
    /// count. Decoding never fails the surrounding request.
    #[must_use]
    pub fn from_bag_json(bag: &str) -> Self {
        let parsed: HashMap<String, bool> = match serde_json::from_str(bag) {
            Ok(map) => map,
            Err(e) => {
                error!("Error parsing permissions: {}", e);
                return Self::default();
            }
        };

        let mut set = BTreeSet::new();
        for (key, granted) in parsed {
            if !granted {
                continue;
            }
            match key.parse::<Permission>() {
                Ok(permission) => {
                    set.insert(permission);
                }
                Err(_) => debug!(permission = %key, "skipping unknown permission key"),
            }
        }
        Self(set)
    }

    /// Serialize as the stored bag layout: `{"PERMISSION": true, ...}`.
    #[must_use]
    pub fn to_bag_json(&self) -> String {
        let map: BTreeMap<&str, bool> = self.0.iter().map(|p| (p.as_ref(), true)).collect();
        serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A member's resolved permissions: either the built-in-role bypass or a
/// concrete set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectivePermissions {
    /// Built-in role bypass: every permission check passes.
    All,
    Granted(PermissionSet),
}

impl EffectivePermissions {
    #[must_use]
    pub fn empty() -> Self {
        EffectivePermissions::Granted(PermissionSet::new())
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, EffectivePermissions::All)
    }

    /// Whether the given permission is held. `ADMINISTRATOR` inside a
    /// granted set satisfies every check, mirroring the bypass.
    #[must_use]
    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            EffectivePermissions::All => true,
            EffectivePermissions::Granted(set) => {
                set.contains(Permission::Administrator) || set.contains(permission)
            }
        }
    }

    /// Flatten to a list of identifiers. The bypass expands to the full
    /// catalog in catalog order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Permission> {
        match self {
            EffectivePermissions::All => Permission::iter().collect(),
            EffectivePermissions::Granted(set) => set.iter().collect(),
        }
    }
}

// ============================================================================
// Requirements
// ============================================================================

/// Connective for a permission requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequireMode {
    Any,
    All,
}

/// Permission expression attached to an operation or link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequirement {
    pub mode: RequireMode,
    pub permissions: Vec<Permission>,
}

impl PermissionRequirement {
    #[must_use]
    pub fn any(permissions: Vec<Permission>) -> Self {
        Self {
            mode: RequireMode::Any,
            permissions,
        }
    }

    #[must_use]
    pub fn all(permissions: Vec<Permission>) -> Self {
        Self {
            mode: RequireMode::All,
            permissions,
        }
    }

    #[must_use]
    pub fn satisfied_by(&self, effective: &EffectivePermissions) -> bool {
        match self.mode {
            RequireMode::Any => self.permissions.iter().any(|p| effective.allows(*p)),
            RequireMode::All => self.permissions.iter().all(|p| effective.allows(*p)),
        }
    }
}

/// The single authorization predicate, consumed by navigation filtering,
/// route rules and the action guard alike.
///
/// Semantics: no constraint means "any member". When both a role list
/// and a permission expression are declared, satisfying either grants
/// access; bypass roles pass every permission gate through
/// [`EffectivePermissions::All`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessRequirement {
    pub roles: Option<Vec<BuiltinRole>>,
    pub permissions: Option<PermissionRequirement>,
}

impl AccessRequirement {
    /// Any member of the organization.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn roles(roles: Vec<BuiltinRole>) -> Self {
        Self {
            roles: Some(roles),
            permissions: None,
        }
    }

    #[must_use]
    pub fn permissions(requirement: PermissionRequirement) -> Self {
        Self {
            roles: None,
            permissions: Some(requirement),
        }
    }

    #[must_use]
    pub fn roles_or_permissions(
        roles: Vec<BuiltinRole>,
        requirement: PermissionRequirement,
    ) -> Self {
        Self {
            roles: Some(roles),
            permissions: Some(requirement),
        }
    }

    #[must_use]
    pub fn permits(&self, roles: &[BuiltinRole], effective: &EffectivePermissions) -> bool {
        match (&self.roles, &self.permissions) {
            (None, None) => true,
            (Some(required), None) => is_in_roles(roles, required),
            (None, Some(requirement)) => requirement.satisfied_by(effective),
            (Some(required), Some(requirement)) => {
                is_in_roles(roles, required) || requirement.satisfied_by(effective)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_string_codec() {
        assert_eq!(Permission::EditCitizens.as_ref(), "EDIT_CITIZENS");
        assert_eq!(Permission::UseSignal100.as_ref(), "USE_SIGNAL100");
        assert_eq!(
            "MANAGE_CALLS".parse::<Permission>().unwrap(),
            Permission::ManageCalls
        );
        assert!("NOT_A_PERMISSION".parse::<Permission>().is_err());
    }

    #[test]
    fn test_catalog_covers_every_permission() {
        let in_catalog: BTreeSet<Permission> = permission_catalog()
            .iter()
            .flat_map(|c| c.permissions.iter().copied())
            .collect();
        for permission in Permission::iter() {
            assert!(in_catalog.contains(&permission), "{permission} not in catalog");
        }
    }

    #[test]
    fn test_bag_decode_keeps_true_entries_only() {
        let set = PermissionSet::from_bag_json(
            r#"{"MANAGE_CALLS": true, "VIEW_DISPATCH": true, "EDIT_CITIZENS": false}"#,
        );
        assert_eq!(set.len(), 2);
        assert!(set.contains(Permission::ManageCalls));
        assert!(set.contains(Permission::ViewDispatch));
        assert!(!set.contains(Permission::EditCitizens));
    }

    #[test]
    fn test_bag_decode_malformed_json_degrades_to_empty() {
        assert!(PermissionSet::from_bag_json("not json at all").is_empty());
        assert!(PermissionSet::from_bag_json(r#"{"MANAGE_CALLS": "yes"}"#).is_empty());
    }

    #[test]
    fn test_bag_decode_skips_unknown_keys() {
        let set = PermissionSet::from_bag_json(r#"{"FLY_HELICOPTER": true, "MANAGE_CALLS": true}"#);
        assert_eq!(set.len(), 1);
        assert!(set.contains(Permission::ManageCalls));
    }

    #[test]
    fn test_bag_roundtrip() {
        let set: PermissionSet =
            [Permission::ManageCalls, Permission::ViewDispatch].into_iter().collect();
        let decoded = PermissionSet::from_bag_json(&set.to_bag_json());
        assert_eq!(set, decoded);
    }

    #[test]
    fn test_administrator_escape_hatch() {
        let effective = EffectivePermissions::Granted(
            [Permission::Administrator].into_iter().collect(),
        );
        assert!(effective.allows(Permission::ManageWarrants));
        assert!(effective.allows(Permission::DeclareDead));
    }

    #[test]
    fn test_all_expands_to_full_catalog() {
        let all = EffectivePermissions::All.to_vec();
        assert_eq!(all.len(), Permission::iter().count());
        assert_eq!(all.first(), Some(&Permission::ViewDashboard));
    }

    #[test]
    fn test_requirement_modes() {
        let granted: EffectivePermissions =
            EffectivePermissions::Granted([Permission::EditCitizens].into_iter().collect());

        let any = PermissionRequirement::any(vec![
            Permission::EditCitizens,
            Permission::CreateCitizens,
        ]);
        assert!(any.satisfied_by(&granted));

        let all = PermissionRequirement::all(vec![
            Permission::EditCitizens,
            Permission::CreateCitizens,
        ]);
        assert!(!all.satisfied_by(&granted));
        assert!(all.satisfied_by(&EffectivePermissions::All));
    }

    #[test]
    fn test_access_requirement_no_constraint_always_permits() {
        let req = AccessRequirement::none();
        assert!(req.permits(&[BuiltinRole::Member], &EffectivePermissions::empty()));
    }

    #[test]
    fn test_access_requirement_role_gate() {
        let req = AccessRequirement::roles(vec![BuiltinRole::Admin, BuiltinRole::Owner]);
        assert!(req.permits(&[BuiltinRole::Admin], &EffectivePermissions::empty()));
        assert!(!req.permits(&[BuiltinRole::Member], &EffectivePermissions::All));
    }

    #[test]
    fn test_access_requirement_either_side_grants() {
        let req = AccessRequirement::roles_or_permissions(
            vec![BuiltinRole::Admin, BuiltinRole::Owner],
            PermissionRequirement::any(vec![Permission::EditCitizens]),
        );

        // Admin passes by role, even with an empty set.
        assert!(req.permits(&[BuiltinRole::Admin], &EffectivePermissions::empty()));
        // Member passes by permission.
        let granted = EffectivePermissions::Granted([Permission::EditCitizens].into_iter().collect());
        assert!(req.permits(&[BuiltinRole::Member], &granted));
        // Member with neither is rejected.
        assert!(!req.permits(&[BuiltinRole::Member], &EffectivePermissions::empty()));
    }
}
