//! Sidebar navigation configuration and filtering.
//!
//! The navigation tree is static configuration, never persisted. Links
//! carry the same [`crate::auth::AccessRequirement`] the route behind
//! them enforces, so filtering and page access always agree.

pub mod filter;
pub mod links;

pub use filter::{filter_navigation, replace_slug};
pub use links::{
    access_for_segment, server_links, special_path_rules, NavigationGroup, NavigationLink,
    SpecialPathRule, SERVER_PATH,
};
