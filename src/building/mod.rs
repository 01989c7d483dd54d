mod repository;
mod service;

pub use repository::{BuildingRepository, PgBuildingRepository};
pub use service::{BuildingRequest, BuildingResponse, BuildingService};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::Claims;
use crate::error::{ApiError, StoreError};
use crate::pagination::{ListParams, Page};
use crate::validate::JsonBody;
use crate::BUILDING_TAG;

pub fn router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(query_buildings, create_building))
        .routes(routes!(get_building, update_building, delete_building))
}

/// Get building
#[utoipa::path(get, path = "/buildings/{id}",
    responses((status = OK, body = BuildingResponse), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Building id")),
    tag = BUILDING_TAG, security(("jwt" = []))
)]
async fn get_building(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<BuildingResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.buildings.get(&mut *conn, &id).await?))
}

/// List buildings
#[utoipa::path(get, path = "/buildings",
    responses((status = OK, body = Page<BuildingResponse>)),
    params(ListParams),
    tag = BUILDING_TAG, security(("jwt" = []))
)]
async fn query_buildings(
    _: Claims,
    State(state): State<crate::State>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<BuildingResponse>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let pages = params.pages(state.buildings.count(&mut *conn).await?);
    let items = state
        .buildings
        .query(&mut *conn, pages.offset(), pages.limit())
        .await?;
    Ok(Json(pages.with_items(items)))
}

/// Create building
#[utoipa::path(post, path = "/buildings",
    request_body = BuildingRequest,
    responses((status = CREATED, body = BuildingResponse), (status = BAD_REQUEST)),
    tag = BUILDING_TAG, security(("jwt" = []))
)]
async fn create_building(
    _: Claims,
    State(state): State<crate::State>,
    JsonBody(input): JsonBody<BuildingRequest>,
) -> Result<(StatusCode, Json<BuildingResponse>), ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let building = state.buildings.create(&mut *conn, input).await?;
    Ok((StatusCode::CREATED, Json(building)))
}

/// Update building
#[utoipa::path(put, path = "/buildings/{id}",
    request_body = BuildingRequest,
    responses((status = OK, body = BuildingResponse), (status = NOT_FOUND), (status = BAD_REQUEST)),
    params(("id" = String, Path, description = "Building id")),
    tag = BUILDING_TAG, security(("jwt" = []))
)]
async fn update_building(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<BuildingRequest>,
) -> Result<Json<BuildingResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.buildings.update(&mut *conn, &id, input).await?))
}

/// Delete building
#[utoipa::path(delete, path = "/buildings/{id}",
    responses((status = OK, body = BuildingResponse), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Building id")),
    tag = BUILDING_TAG, security(("jwt" = []))
)]
async fn delete_building(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<BuildingResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.buildings.delete(&mut *conn, &id).await?))
}
