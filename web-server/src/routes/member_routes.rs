//! Member listing and built-in role management.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, patch};
use axum::Router;
use serde::Deserialize;

use mdt_admin::actions::member_actions::UpdateMemberRoleInput;
use mdt_admin::actions::{member_access, owner_only_access};
use mdt_admin::models::MemberWithProfile;

use crate::api::{parse_id, require_user_id, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/servers/:slug/members", get(list_members))
        .route("/servers/:slug/members/:member_id/role", patch(update_member_role))
}

#[derive(Deserialize)]
struct MemberQuery {
    q: Option<String>,
}

async fn list_members(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<MemberQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<MemberWithProfile>>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &member_access())
        .await?;

    let members = state
        .member_actions
        .list_members(&ctx, query.q.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(members)))
}

async fn update_member_role(
    State(state): State<AppState>,
    Path((slug, member_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<UpdateMemberRoleInput>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let member_id = parse_id(&member_id, "member")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &owner_only_access())
        .await?;

    state
        .member_actions
        .update_member_role(&ctx, member_id, input)
        .await?;
    Ok(Json(ApiResponse::ok(true)))
}
