//! API route modules.

pub mod citizen_routes;
pub mod member_routes;
pub mod role_routes;
pub mod server_routes;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(server_routes::router())
        .merge(role_routes::router())
        .merge(member_routes::router())
        .merge(citizen_routes::router())
}
