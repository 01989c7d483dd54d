mod repository;
mod service;

pub use repository::{CareerRepository, PgCareerRepository};
pub use service::{CareerRequest, CareerResponse, CareerService};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::Claims;
use crate::error::{ApiError, StoreError};
use crate::pagination::{ListParams, Page};
use crate::validate::JsonBody;
use crate::CAREER_TAG;

/// Careers have no delete route.
pub fn router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(query_careers, create_career))
        .routes(routes!(get_career, update_career))
}

/// Get career
#[utoipa::path(get, path = "/careers/{id}",
    responses((status = OK, body = CareerResponse), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "Career id")),
    tag = CAREER_TAG, security(("jwt" = []))
)]
async fn get_career(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<CareerResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.careers.get(&mut *conn, &id).await?))
}

/// List careers with their groups
#[utoipa::path(get, path = "/careers",
    responses((status = OK, body = Page<CareerResponse>)),
    params(ListParams),
    tag = CAREER_TAG, security(("jwt" = []))
)]
async fn query_careers(
    _: Claims,
    State(state): State<crate::State>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<CareerResponse>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let pages = params.pages(state.careers.count(&mut *conn).await?);
    let items = state
        .careers
        .query(&mut *conn, pages.offset(), pages.limit())
        .await?;
    Ok(Json(pages.with_items(items)))
}

/// Create career
#[utoipa::path(post, path = "/careers",
    request_body = CareerRequest,
    responses((status = CREATED, body = CareerResponse), (status = BAD_REQUEST)),
    tag = CAREER_TAG, security(("jwt" = []))
)]
async fn create_career(
    _: Claims,
    State(state): State<crate::State>,
    JsonBody(input): JsonBody<CareerRequest>,
) -> Result<(StatusCode, Json<CareerResponse>), ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let career = state.careers.create(&mut *conn, input).await?;
    Ok((StatusCode::CREATED, Json(career)))
}

/// Update career
#[utoipa::path(put, path = "/careers/{id}",
    request_body = CareerRequest,
    responses((status = OK, body = CareerResponse), (status = NOT_FOUND), (status = BAD_REQUEST)),
    params(("id" = String, Path, description = "Career id")),
    tag = CAREER_TAG, security(("jwt" = []))
)]
async fn update_career(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CareerRequest>,
) -> Result<Json<CareerResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.careers.update(&mut *conn, &id, input).await?))
}
