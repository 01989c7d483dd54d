mod repository;
mod service;

pub use repository::{PgUserRepository, UserRepository};
pub use service::{CreateUserRequest, UpdateUserRequest, UserResponse, UserService};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::auth::Claims;
use crate::error::{ApiError, StoreError};
use crate::pagination::{ListParams, Page};
use crate::validate::JsonBody;
use crate::USER_TAG;

pub fn router() -> OpenApiRouter<crate::State> {
    OpenApiRouter::new()
        .routes(routes!(query_users, create_user))
        .routes(routes!(current_user))
        .routes(routes!(get_user, update_user, delete_user))
}

/// Get the authenticated user
#[utoipa::path(get, path = "/users/me",
    responses((status = OK, body = UserResponse), (status = UNAUTHORIZED)),
    tag = USER_TAG, security(("jwt" = []))
)]
async fn current_user(
    claims: Claims,
    State(state): State<crate::State>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.users.get(&mut *conn, &claims.sub).await?))
}

/// Get user
#[utoipa::path(get, path = "/users/{id}",
    responses((status = OK, body = UserResponse), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "User id")),
    tag = USER_TAG, security(("jwt" = []))
)]
async fn get_user(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.users.get(&mut *conn, &id).await?))
}

/// List users
#[utoipa::path(get, path = "/users",
    responses((status = OK, body = Page<UserResponse>)),
    params(ListParams),
    tag = USER_TAG, security(("jwt" = []))
)]
async fn query_users(
    _: Claims,
    State(state): State<crate::State>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let pages = params.pages(state.users.count(&mut *conn).await?);
    let items = state
        .users
        .query(&mut *conn, pages.offset(), pages.limit())
        .await?;
    Ok(Json(pages.with_items(items)))
}

/// Create user
#[utoipa::path(post, path = "/users",
    request_body = CreateUserRequest,
    responses((status = CREATED, body = UserResponse), (status = BAD_REQUEST)),
    tag = USER_TAG, security(("jwt" = []))
)]
async fn create_user(
    _: Claims,
    State(state): State<crate::State>,
    JsonBody(input): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    let user = state.users.create(&mut *conn, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update user
///
/// An empty password leaves the current one in place.
#[utoipa::path(put, path = "/users/{id}",
    request_body = UpdateUserRequest,
    responses((status = OK, body = UserResponse), (status = NOT_FOUND), (status = BAD_REQUEST)),
    params(("id" = String, Path, description = "User id")),
    tag = USER_TAG, security(("jwt" = []))
)]
async fn update_user(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.users.update(&mut *conn, &id, input).await?))
}

/// Delete user
#[utoipa::path(delete, path = "/users/{id}",
    responses((status = OK, body = UserResponse), (status = NOT_FOUND)),
    params(("id" = String, Path, description = "User id")),
    tag = USER_TAG, security(("jwt" = []))
)]
async fn delete_user(
    _: Claims,
    State(state): State<crate::State>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut conn = state.pool.get().await.map_err(StoreError::from)?;
    Ok(Json(state.users.delete(&mut *conn, &id).await?))
}
