//! MDT-ADMIN - multi-tenant administration backend
//!
//! Core library of a CAD/MDT-style community management product. An
//! organization ("server" in product language) carries members with
//! built-in roles, tenant-defined custom roles with permission bags,
//! departments and permission-gated citizen records.
//!
//! Authorization flows one way: a request establishes the caller, the
//! [`auth::ActionGuard`] re-derives membership and role server-side,
//! the resolver computes effective permissions, and navigation
//! filtering or the guarded action consumes them through the shared
//! [`auth::AccessRequirement`] predicate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdt_admin::auth::{ActionGuard, AccessRequirement};
//! use mdt_admin::database::DatabaseManager;
//!
//! # async fn run(user_id: uuid::Uuid) -> mdt_admin::error::AdminResult<()> {
//! let db = DatabaseManager::with_default_config().await?;
//! let members = db.member_repository();
//! let ctx = ActionGuard::new(&members)
//!     .authorize("rp-city", user_id, &AccessRequirement::none())
//!     .await?;
//! println!("{} permissions", ctx.permissions.to_vec().len());
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Persisted row types
pub mod models;

// Roles, permissions, resolver and guard
pub mod auth;

// Static navigation tree and filtering
pub mod navigation;

// Connection management and repositories
pub mod database;

// Mutation entry points
pub mod actions;

// Public re-exports for the common path
pub use actions::{CitizenActions, MemberActions, RoleActions};
pub use auth::{
    is_in_roles, resolve_permissions, AccessRequirement, ActionGuard, BuiltinRole,
    EffectivePermissions, MemberDirectory, Permission, PermissionRequirement, PermissionSet,
    ServerContext,
};
pub use database::{DatabaseConfig, DatabaseManager};
pub use error::{ActionError, AdminError, AdminResult};
pub use navigation::{filter_navigation, replace_slug, server_links};
