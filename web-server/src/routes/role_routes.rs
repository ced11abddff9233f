//! Role, role-membership and department endpoints.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{delete, get};
use axum::Router;
use serde::Serialize;

use mdt_admin::actions::role_actions::{
    AddMembersInput, BulkAssignment, CreateDepartmentInput, CreateRoleInput, UpdateRoleInput,
};
use mdt_admin::actions::{member_access, role_management_access};
use mdt_admin::models::{CustomRole, Department, MemberWithProfile};

use crate::api::{parse_id, require_user_id, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/servers/:slug/roles", get(list_roles).post(create_role))
        .route(
            "/servers/:slug/roles/:role_id",
            axum::routing::patch(update_role).delete(delete_role),
        )
        .route(
            "/servers/:slug/roles/:role_id/members",
            get(role_members).post(add_members),
        )
        .route(
            "/servers/:slug/roles/:role_id/members/:member_id",
            delete(remove_member),
        )
        .route(
            "/servers/:slug/departments",
            get(list_departments).post(create_department),
        )
        .route(
            "/servers/:slug/departments/:department_id",
            delete(delete_department),
        )
}

async fn list_roles(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<CustomRole>>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let roles = state.roles.list_roles(&ctx).await?;
    Ok(Json(ApiResponse::ok(roles)))
}

async fn create_role(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CreateRoleInput>,
) -> Result<Json<ApiResponse<CustomRole>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let role = state.roles.create_role(&ctx, input).await?;
    Ok(Json(ApiResponse::ok(role)))
}

async fn update_role(
    State(state): State<AppState>,
    Path((slug, role_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<UpdateRoleInput>,
) -> Result<Json<ApiResponse<CustomRole>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let role_id = parse_id(&role_id, "role")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let role = state.roles.update_role(&ctx, role_id, input).await?;
    Ok(Json(ApiResponse::ok(role)))
}

/// Payload of a role deletion: how many members had the role cleared.
#[derive(Serialize)]
struct RoleDeleted {
    cleared_members: u64,
}

async fn delete_role(
    State(state): State<AppState>,
    Path((slug, role_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<RoleDeleted>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let role_id = parse_id(&role_id, "role")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let cleared_members = state.roles.delete_role(&ctx, role_id).await?;
    Ok(Json(ApiResponse::ok(RoleDeleted { cleared_members })))
}

async fn role_members(
    State(state): State<AppState>,
    Path((slug, role_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<MemberWithProfile>>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let role_id = parse_id(&role_id, "role")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let members = state.roles.members_of_role(&ctx, role_id).await?;
    Ok(Json(ApiResponse::ok(members)))
}

async fn add_members(
    State(state): State<AppState>,
    Path((slug, role_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(mut input): Json<AddMembersInput>,
) -> Result<Json<ApiResponse<BulkAssignment>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    input.role_id = parse_id(&role_id, "role")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let report = state.roles.add_members_to_role(&ctx, input).await?;
    Ok(Json(ApiResponse::ok(report)))
}

async fn remove_member(
    State(state): State<AppState>,
    Path((slug, role_id, member_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let role_id = parse_id(&role_id, "role")?;
    let member_id = parse_id(&member_id, "member")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    state
        .roles
        .remove_member_from_role(&ctx, role_id, member_id)
        .await?;
    Ok(Json(ApiResponse::ok(true)))
}

async fn list_departments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Department>>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &member_access())
        .await?;

    let departments = state.roles.list_departments(&ctx).await?;
    Ok(Json(ApiResponse::ok(departments)))
}

async fn create_department(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CreateDepartmentInput>,
) -> Result<Json<ApiResponse<Department>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let department = state.roles.create_department(&ctx, input).await?;
    Ok(Json(ApiResponse::ok(department)))
}

/// Payload of a department deletion: how many roles lost the reference.
#[derive(Serialize)]
struct DepartmentDeleted {
    cleared_roles: u64,
}

async fn delete_department(
    State(state): State<AppState>,
    Path((slug, department_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<DepartmentDeleted>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let department_id = parse_id(&department_id, "department")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &role_management_access())
        .await?;

    let cleared_roles = state.roles.delete_department(&ctx, department_id).await?;
    Ok(Json(ApiResponse::ok(DepartmentDeleted { cleared_roles })))
}
