//! Pure navigation filtering.

use crate::auth::permissions::EffectivePermissions;
use crate::auth::roles::BuiltinRole;

use super::links::{NavigationGroup, NavigationLink};

/// Filter a navigation tree down to the links the caller may see.
///
/// Pure and order-preserving; the source configuration is never
/// mutated. A link with no constraint is always kept; groups left empty
/// after filtering are dropped.
#[must_use]
pub fn filter_navigation(
    groups: &[NavigationGroup],
    roles: &[BuiltinRole],
    effective: &EffectivePermissions,
) -> Vec<NavigationGroup> {
    groups
        .iter()
        .filter_map(|group| {
            let links: Vec<NavigationLink> = group
                .links
                .iter()
                .filter(|link| link.access.permits(roles, effective))
                .cloned()
                .collect();

            if links.is_empty() {
                return None;
            }

            Some(NavigationGroup {
                title: group.title,
                default_open_start_path: group.default_open_start_path.clone(),
                links,
            })
        })
        .collect()
}

/// Substitute the `:serverSlug` placeholder in a configured href.
#[must_use]
pub fn replace_slug(href: &str, slug: &str) -> String {
    href.replace(":serverSlug", slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{Permission, PermissionSet};
    use crate::navigation::links::server_links;

    fn granted(permissions: &[Permission]) -> EffectivePermissions {
        EffectivePermissions::Granted(permissions.iter().copied().collect::<PermissionSet>())
    }

    fn labels(groups: &[NavigationGroup]) -> Vec<&'static str> {
        groups
            .iter()
            .flat_map(|g| g.links.iter().map(|l| l.label))
            .collect()
    }

    #[test]
    fn test_plain_member_sees_unconstrained_links_only() {
        let groups = server_links();
        let filtered = filter_navigation(
            &groups,
            &[BuiltinRole::Member],
            &EffectivePermissions::Granted(PermissionSet::new()),
        );

        assert_eq!(labels(&filtered), vec!["Dashboard"]);
        // The "Server" group lost every link and is dropped entirely.
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_member_with_citizen_permission_sees_citizens_link() {
        let groups = server_links();
        let filtered = filter_navigation(
            &groups,
            &[BuiltinRole::Member],
            &granted(&[Permission::EditCitizens]),
        );

        assert_eq!(labels(&filtered), vec!["Dashboard", "Citizens"]);
    }

    #[test]
    fn test_admin_sees_everything_but_danger_zone() {
        let groups = server_links();
        let filtered =
            filter_navigation(&groups, &[BuiltinRole::Admin], &EffectivePermissions::All);

        let visible = labels(&filtered);
        assert!(visible.contains(&"Roles"));
        assert!(visible.contains(&"Billing"));
        assert!(!visible.contains(&"Danger Zone"));
    }

    #[test]
    fn test_owner_sees_the_full_tree_in_order() {
        let groups = server_links();
        let filtered =
            filter_navigation(&groups, &[BuiltinRole::Owner], &EffectivePermissions::All);

        assert_eq!(
            labels(&filtered),
            vec![
                "Dashboard",
                "Citizens",
                "Users",
                "Settings",
                "Members",
                "Roles",
                "Billing",
                "Danger Zone",
            ]
        );
    }

    #[test]
    fn test_filter_never_mutates_the_source() {
        let groups = server_links();
        let before = groups.clone();
        let _ = filter_navigation(
            &groups,
            &[BuiltinRole::Member],
            &EffectivePermissions::Granted(PermissionSet::new()),
        );
        assert_eq!(groups, before);
    }

    #[test]
    fn test_replace_slug() {
        assert_eq!(
            replace_slug("/servers/:serverSlug/settings/roles", "rp-city"),
            "/servers/rp-city/settings/roles"
        );
    }
}
