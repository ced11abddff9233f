//! Shared application state.

use sqlx::PgPool;

use mdt_admin::actions::{CitizenActions, MemberActions, RoleActions};
use mdt_admin::auth::ActionGuard;
use mdt_admin::database::{MemberRepository, OrganizationRepository};

#[derive(Clone)]
pub struct AppState {
    pub organizations: OrganizationRepository,
    pub members: MemberRepository,
    pub roles: RoleActions,
    pub member_actions: MemberActions,
    pub citizens: CitizenActions,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            organizations: OrganizationRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            roles: RoleActions::new(pool.clone()),
            member_actions: MemberActions::new(pool.clone()),
            citizens: CitizenActions::new(pool),
        }
    }

    /// Guard over the member directory, built per request.
    pub fn guard(&self) -> ActionGuard<'_> {
        ActionGuard::new(&self.members)
    }
}
