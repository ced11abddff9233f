//! Static navigation tree and route-level access rules.

use serde::Serialize;

use crate::auth::permissions::{AccessRequirement, Permission, PermissionRequirement};
use crate::auth::roles::BuiltinRole;

/// Path prefix of every server-scoped page. `:serverSlug` is substituted
/// with [`super::replace_slug`].
pub const SERVER_PATH: &str = "/servers/:serverSlug";

/// One sidebar entry. `icon` is the client-side icon name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationLink {
    pub href: String,
    pub icon: &'static str,
    pub label: &'static str,
    #[serde(skip)]
    pub access: AccessRequirement,
}

/// Titled group of sidebar entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationGroup {
    pub title: &'static str,
    pub default_open_start_path: Option<String>,
    pub links: Vec<NavigationLink>,
}

/// The server navigation tree.
#[must_use]
pub fn server_links() -> Vec<NavigationGroup> {
    vec![
        NavigationGroup {
            title: "Menu",
            default_open_start_path: None,
            links: vec![
                NavigationLink {
                    href: SERVER_PATH.to_string(),
                    icon: "home",
                    label: "Dashboard",
                    access: AccessRequirement::none(),
                },
                NavigationLink {
                    href: format!("{SERVER_PATH}/citizens"),
                    icon: "users",
                    label: "Citizens",
                    access: AccessRequirement::roles_or_permissions(
                        vec![BuiltinRole::Admin, BuiltinRole::Owner],
                        PermissionRequirement::any(vec![
                            Permission::EditCitizens,
                            Permission::CreateCitizens,
                        ]),
                    ),
                },
                NavigationLink {
                    href: format!("{SERVER_PATH}/users"),
                    icon: "user",
                    label: "Users",
                    access: AccessRequirement::permissions(PermissionRequirement::any(vec![
                        Permission::ManageUsers,
                    ])),
                },
            ],
        },
        NavigationGroup {
            title: "Server",
            default_open_start_path: Some(format!("{SERVER_PATH}/settings")),
            links: vec![
                NavigationLink {
                    href: format!("{SERVER_PATH}/settings"),
                    icon: "settings",
                    label: "Settings",
                    access: AccessRequirement::roles_or_permissions(
                        vec![BuiltinRole::Admin, BuiltinRole::Owner],
                        PermissionRequirement::any(vec![Permission::EditServerSettings]),
                    ),
                },
                NavigationLink {
                    href: format!("{SERVER_PATH}/settings/members"),
                    icon: "user-2",
                    label: "Members",
                    access: AccessRequirement::roles(vec![BuiltinRole::Admin, BuiltinRole::Owner]),
                },
                NavigationLink {
                    href: format!("{SERVER_PATH}/settings/roles"),
                    icon: "shield",
                    label: "Roles",
                    access: AccessRequirement::roles(vec![BuiltinRole::Admin, BuiltinRole::Owner]),
                },
                NavigationLink {
                    href: format!("{SERVER_PATH}/settings/billing"),
                    icon: "credit-card",
                    label: "Billing",
                    access: AccessRequirement::roles(vec![BuiltinRole::Admin, BuiltinRole::Owner]),
                },
                NavigationLink {
                    href: format!("{SERVER_PATH}/settings/danger"),
                    icon: "triangle-alert",
                    label: "Danger Zone",
                    access: AccessRequirement::roles(vec![BuiltinRole::Owner]),
                },
            ],
        },
    ]
}

/// Route-level access rule for a server-scoped path segment.
#[derive(Debug, Clone)]
pub struct SpecialPathRule {
    pub segment: &'static str,
    pub access: AccessRequirement,
    pub log_message: &'static str,
}

/// Access rules for path segments whose pages perform their own gate.
/// Same predicate type as the navigation links above.
#[must_use]
pub fn special_path_rules() -> Vec<SpecialPathRule> {
    vec![
        SpecialPathRule {
            segment: "citizens",
            access: AccessRequirement::permissions(PermissionRequirement::any(vec![
                Permission::EditCitizens,
                Permission::CreateCitizens,
            ])),
            log_message: "Access denied to citizens section",
        },
        SpecialPathRule {
            segment: "settings",
            access: AccessRequirement::permissions(PermissionRequirement::any(vec![
                Permission::EditServerSettings,
            ])),
            log_message: "Access denied to settings section",
        },
        SpecialPathRule {
            segment: "users",
            access: AccessRequirement::permissions(PermissionRequirement::any(vec![
                Permission::ManageUsers,
            ])),
            log_message: "Access denied to users section",
        },
    ]
}

/// Look up the access rule for a path segment, if any.
#[must_use]
pub fn access_for_segment(segment: &str) -> Option<AccessRequirement> {
    special_path_rules()
        .into_iter()
        .find(|rule| rule.segment == segment)
        .map(|rule| rule.access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{citizen_read_access, role_management_access};
    use crate::auth::permissions::{EffectivePermissions, PermissionSet};

    #[test]
    fn test_access_for_segment_lookup() {
        assert!(access_for_segment("citizens").is_some());
        assert!(access_for_segment("settings").is_some());
        assert!(access_for_segment("dashboard").is_none());
    }

    #[test]
    fn test_citizens_route_rule_matches_citizen_actions() {
        // One predicate for the route rule and the citizen read actions.
        assert_eq!(access_for_segment("citizens").unwrap(), citizen_read_access());
    }

    #[test]
    fn test_link_visibility_agrees_with_route_access() {
        // A member granted EDIT_CITIZENS both sees the citizens link and
        // passes the citizens route rule; one without sees and passes
        // neither.
        let granted = EffectivePermissions::Granted(
            [Permission::EditCitizens].into_iter().collect::<PermissionSet>(),
        );
        let empty = EffectivePermissions::Granted(PermissionSet::new());
        let roles = [BuiltinRole::Member];

        let citizens_link = server_links()
            .into_iter()
            .flat_map(|group| group.links)
            .find(|link| link.label == "Citizens")
            .unwrap();
        let route_rule = access_for_segment("citizens").unwrap();

        assert!(citizens_link.access.permits(&roles, &granted));
        assert!(route_rule.permits(&roles, &granted));
        assert!(!citizens_link.access.permits(&roles, &empty));
        assert!(!route_rule.permits(&roles, &empty));
    }

    #[test]
    fn test_role_links_match_role_management_gate() {
        let roles_link = server_links()
            .into_iter()
            .flat_map(|group| group.links)
            .find(|link| link.label == "Roles")
            .unwrap();

        for role in [BuiltinRole::Admin, BuiltinRole::Owner] {
            assert!(roles_link.access.permits(&[role], &EffectivePermissions::All));
            assert!(role_management_access().permits(&[role], &EffectivePermissions::All));
        }
        let empty = EffectivePermissions::Granted(PermissionSet::new());
        assert!(!roles_link.access.permits(&[BuiltinRole::Member], &empty));
        assert!(!role_management_access().permits(&[BuiltinRole::Member], &empty));
    }
}
