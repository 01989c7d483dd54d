mod repository;
mod service;

pub use repository::{PgRoleRepository, RoleRepository};
pub use service::{RoleRequest, RoleResponse, RoleService};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::Claims;
use crate::error::{ApiError, StoreError};
use crate::model::Role;
use crate::pagination::{ListParams, Page};
use crate::validate::JsonBody;
use crate::ROLE_TAG;

pub fn router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(query_roles, create_role))
        .routes(routes!(get_role, update_role, delete_role))
}

/// Get role
#[utoipa::path(get, path = "/roles/{id}",
    responses((status = OK, body = Role), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Role id")),
    tag = ROLE_TAG, security(("jwt" = []))
)]
async fn get_role(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.roles.get(&mut *conn, &id).await?))
}

/// List roles
#[utoipa::path(get, path = "/roles",
    responses((status = OK, body = Page<Role>)),
    params(ListParams),
    tag = ROLE_TAG, security(("jwt" = []))
)]
async fn query_roles(
    _: Claims,
    State(state): State<crate::State>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<RoleResponse>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let pages = params.pages(state.roles.count(&mut *conn).await?);
    let items = state
        .roles
        .query(&mut *conn, pages.offset(), pages.limit())
        .await?;
    Ok(Json(pages.with_items(items)))
}

/// Create role
#[utoipa::path(post, path = "/roles",
    request_body = RoleRequest,
    responses((status = CREATED, body = Role), (status = BAD_REQUEST)),
    tag = ROLE_TAG, security(("jwt" = []))
)]
async fn create_role(
    _: Claims,
    State(state): State<crate::State>,
    JsonBody(input): JsonBody<RoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let role = state.roles.create(&mut *conn, input).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// Update role
#[utoipa::path(put, path = "/roles/{id}",
    request_body = RoleRequest,
    responses((status = OK, body = Role), (status = NOT_FOUND), (status = BAD_REQUEST)),
    params(("id" = String, Path, description = "Role id")),
    tag = ROLE_TAG, security(("jwt" = []))
)]
async fn update_role(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<RoleRequest>,
) -> Result<Json<RoleResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.roles.update(&mut *conn, &id, input).await?))
}

/// Delete role
#[utoipa::path(delete, path = "/roles/{id}",
    responses((status = OK, body = Role), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Role id")),
    tag = ROLE_TAG, security(("jwt" = []))
)]
async fn delete_role(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.roles.delete(&mut *conn, &id).await?))
}
