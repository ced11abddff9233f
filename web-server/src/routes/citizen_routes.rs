//! Citizen record endpoints.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::get;
use axum::Router;

use mdt_admin::actions::citizen_actions::CitizenInput;
use mdt_admin::actions::{citizen_create_access, citizen_edit_access, citizen_read_access};
use mdt_admin::models::Citizen;

use crate::api::{parse_id, require_user_id, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/servers/:slug/citizens", get(list_citizens).post(create_citizen))
        .route(
            "/servers/:slug/citizens/:citizen_id",
            get(get_citizen).patch(update_citizen).delete(delete_citizen),
        )
}

async fn list_citizens(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Citizen>>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &citizen_read_access())
        .await?;

    let citizens = state.citizens.list_citizens(&ctx).await?;
    Ok(Json(ApiResponse::ok(citizens)))
}

async fn get_citizen(
    State(state): State<AppState>,
    Path((slug, citizen_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Citizen>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let citizen_id = parse_id(&citizen_id, "citizen")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &citizen_read_access())
        .await?;

    let citizen = state.citizens.get_citizen(&ctx, citizen_id).await?;
    Ok(Json(ApiResponse::ok(citizen)))
}

async fn create_citizen(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(input): Json<CitizenInput>,
) -> Result<Json<ApiResponse<Citizen>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &citizen_create_access())
        .await?;

    let citizen = state.citizens.create_citizen(&ctx, input).await?;
    Ok(Json(ApiResponse::ok(citizen)))
}

async fn update_citizen(
    State(state): State<AppState>,
    Path((slug, citizen_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<CitizenInput>,
) -> Result<Json<ApiResponse<Citizen>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let citizen_id = parse_id(&citizen_id, "citizen")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &citizen_edit_access())
        .await?;

    let citizen = state.citizens.update_citizen(&ctx, citizen_id, input).await?;
    Ok(Json(ApiResponse::ok(citizen)))
}

async fn delete_citizen(
    State(state): State<AppState>,
    Path((slug, citizen_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let citizen_id = parse_id(&citizen_id, "citizen")?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &citizen_edit_access())
        .await?;

    state.citizens.delete_citizen(&ctx, citizen_id).await?;
    Ok(Json(ApiResponse::ok(true)))
}
