//! Server listing, effective permissions and filtered navigation.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use mdt_admin::actions::member_access;
use mdt_admin::auth::permissions::permission_catalog;
use mdt_admin::auth::Permission;
use mdt_admin::models::Organization;
use mdt_admin::navigation::{filter_navigation, replace_slug, server_links, NavigationGroup};

use crate::api::{require_user_id, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/permissions/catalog", get(catalog))
        .route("/servers", get(list_servers))
        .route("/servers/:slug/permissions", get(user_permissions))
        .route("/servers/:slug/navigation", get(user_navigation))
}

#[derive(Serialize)]
struct CatalogPermission {
    id: Permission,
    description: &'static str,
}

#[derive(Serialize)]
struct CatalogCategory {
    id: &'static str,
    name: &'static str,
    permissions: Vec<CatalogPermission>,
}

/// The fixed permission catalog, for role editors.
async fn catalog() -> Json<ApiResponse<Vec<CatalogCategory>>> {
    let categories = permission_catalog()
        .iter()
        .map(|category| CatalogCategory {
            id: category.id,
            name: category.name,
            permissions: category
                .permissions
                .iter()
                .map(|permission| CatalogPermission {
                    id: *permission,
                    description: permission.description(),
                })
                .collect(),
        })
        .collect();
    Json(ApiResponse::ok(categories))
}

/// The caller's servers, oldest first.
async fn list_servers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<Organization>>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let servers = state.organizations.organizations_for_user(user_id).await?;
    Ok(Json(ApiResponse::ok(servers)))
}

#[derive(Serialize)]
struct PermissionsPayload {
    permissions: Vec<Permission>,
}

/// The caller's effective permission identifiers. The admin/owner
/// bypass expands to the full catalog.
async fn user_permissions(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<PermissionsPayload>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &member_access())
        .await?;

    Ok(Json(ApiResponse::ok(PermissionsPayload {
        permissions: ctx.permissions.to_vec(),
    })))
}

/// The navigation tree filtered for the caller, with resolved hrefs.
async fn user_navigation(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<NavigationGroup>>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let ctx = state
        .guard()
        .authorize(&slug, user_id, &member_access())
        .await?;

    let mut groups = filter_navigation(&server_links(), &ctx.roles(), &ctx.permissions);
    for group in &mut groups {
        if let Some(path) = group.default_open_start_path.take() {
            group.default_open_start_path = Some(replace_slug(&path, &ctx.slug));
        }
        for link in &mut group.links {
            link.href = replace_slug(&link.href, &ctx.slug);
        }
    }

    Ok(Json(ApiResponse::ok(groups)))
}
