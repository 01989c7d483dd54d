mod repository;
mod service;

pub use repository::{GroupRepository, PgGroupRepository};
pub use service::{GroupRequest, GroupResponse, GroupService};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::Claims;
use crate::error::{ApiError, StoreError};
use crate::model::Group;
use crate::pagination::{ListParams, Page};
use crate::validate::JsonBody;
use crate::GROUP_TAG;

pub fn router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(query_groups, create_group))
        .routes(routes!(get_group, update_group, delete_group))
}

/// Get group
#[utoipa::path(get, path = "/groups/{id}",
    responses((status = OK, body = Group), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Group id")),
    tag = GROUP_TAG, security(("jwt" = []))
)]
async fn get_group(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<GroupResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.groups.get(&mut *conn, &id).await?))
}

/// List groups
#[utoipa::path(get, path = "/groups",
    responses((status = OK, body = Page<Group>)),
    params(ListParams),
    tag = GROUP_TAG, security(("jwt" = []))
)]
async fn query_groups(
    _: Claims,
    State(state): State<crate::State>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<GroupResponse>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let pages = params.pages(state.groups.count(&mut *conn).await?);
    let items = state
        .groups
        .query(&mut *conn, pages.offset(), pages.limit())
        .await?;
    Ok(Json(pages.with_items(items)))
}

/// Create group
#[utoipa::path(post, path = "/groups",
    request_body = GroupRequest,
    responses((status = CREATED, body = Group), (status = BAD_REQUEST)),
    tag = GROUP_TAG, security(("jwt" = []))
)]
async fn create_group(
    _: Claims,
    State(state): State<crate::State>,
    JsonBody(input): JsonBody<GroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let group = state.groups.create(&mut *conn, input).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// Update group
#[utoipa::path(put, path = "/groups/{id}",
    request_body = GroupRequest,
    responses((status = OK, body = Group), (status = NOT_FOUND), (status = BAD_REQUEST)),
    params(("id" = String, Path, description = "Group id")),
    tag = GROUP_TAG, security(("jwt" = []))
)]
async fn update_group(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<GroupRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.groups.update(&mut *conn, &id, input).await?))
}

/// Delete group
#[utoipa::path(delete, path = "/groups/{id}",
    responses((status = OK, body = Group), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Group id")),
    tag = GROUP_TAG, security(("jwt" = []))
)]
async fn delete_group(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<GroupResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.groups.delete(&mut *conn, &id).await?))
}
