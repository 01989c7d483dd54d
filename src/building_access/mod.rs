mod repository;
mod service;

pub use repository::{AccessFilter, BuildingAccessRepository, PgBuildingAccessRepository};
pub use service::{BuildingAccessRequest, BuildingAccessResponse, BuildingAccessService};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::Claims;
use crate::error::{ApiError, StoreError};
use crate::pagination::{ListParams, Page};
use crate::validate::JsonBody;
use crate::BUILDING_ACCESS_TAG;

pub fn router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(query_building_accesses, create_building_access))
        .routes(routes!(
            get_building_access,
            update_building_access,
            delete_building_access
        ))
}

/// Get building access
#[utoipa::path(get, path = "/building-accesses/{id}",
    responses((status = OK, body = BuildingAccessResponse), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Building access id")),
    tag = BUILDING_ACCESS_TAG, security(("jwt" = []))
)]
async fn get_building_access(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<BuildingAccessResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.building_accesses.get(&mut *conn, &id).await?))
}

/// List building accesses
///
/// With `term=by-building-and-not-check-out` and `filters={"building_id": "..."}`
/// only the open sessions of that building are listed. `total_count` always
/// counts the whole table.
#[utoipa::path(get, path = "/building-accesses",
    responses((status = OK, body = Page<BuildingAccessResponse>)),
    params(ListParams),
    tag = BUILDING_ACCESS_TAG, security(("jwt" = []))
)]
async fn query_building_accesses(
    _: Claims,
    State(state): State<crate::State>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<BuildingAccessResponse>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let pages = params.pages(state.building_accesses.count(&mut *conn).await?);
    let items = state
        .building_accesses
        .query(
            &mut *conn,
            pages.offset(),
            pages.limit(),
            params.term(),
            &params.filters(),
        )
        .await?;
    Ok(Json(pages.with_items(items)))
}

/// Create building access
#[utoipa::path(post, path = "/building-accesses",
    request_body = BuildingAccessRequest,
    responses((status = CREATED, body = BuildingAccessResponse), (status = BAD_REQUEST)),
    tag = BUILDING_ACCESS_TAG, security(("jwt" = []))
)]
async fn create_building_access(
    _: Claims,
    State(state): State<crate::State>,
    JsonBody(input): JsonBody<BuildingAccessRequest>,
) -> Result<(StatusCode, Json<BuildingAccessResponse>), ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let access = state.building_accesses.create(&mut *conn, input).await?;
    Ok((StatusCode::CREATED, Json(access)))
}

/// Update building access
#[utoipa::path(put, path = "/building-accesses/{id}",
    request_body = BuildingAccessRequest,
    responses((status = OK, body = BuildingAccessResponse), (status = NOT_FOUND), (status = BAD_REQUEST)),
    params(("id" = String, Path, description = "Building access id")),
    tag = BUILDING_ACCESS_TAG, security(("jwt" = []))
)]
async fn update_building_access(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<BuildingAccessRequest>,
) -> Result<Json<BuildingAccessResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(
        state
            .building_accesses
            .update(&mut *conn, &id, input)
            .await?,
    ))
}

/// Delete building access
#[utoipa::path(delete, path = "/building-accesses/{id}",
    responses((status = OK, body = BuildingAccessResponse), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Building access id")),
    tag = BUILDING_ACCESS_TAG, security(("jwt" = []))
)]
async fn delete_building_access(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<BuildingAccessResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.building_accesses.delete(&mut *conn, &id).await?))
}
