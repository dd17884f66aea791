//! The item API implementation.

use crate::{
    feature::item::item_dto::ItemDto,
    infra::{
        error::{ApiResult, ClientError, ErrorBody},
        extract::Json,
        state::AppState,
        unit_of_work::UnitOfWorkFactory,
    },
};
use axum::{extract::State, Router};
use axum_extra::routing::{RouterExt, TypedPath};
use http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

/// The item API endpoints.
pub fn routes<F: UnitOfWorkFactory>() -> Router<AppState<F>> {
    Router::new()
        .typed_get(list_items::<F>)
        .typed_post(create_item::<F>)
        .typed_get(get_item::<F>)
        .typed_put(update_item::<F>)
        .typed_delete(delete_item::<F>)
}

/// The item collection.
#[derive(Deserialize, TypedPath)]
#[typed_path("/items", rejection(ClientError))]
pub struct Items;

/// A single item.
#[derive(Deserialize, TypedPath)]
#[typed_path("/items/:id", rejection(ClientError))]
pub struct ItemsId(i32);

/// Lists all items.
#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "Success", body = [ItemDto]),
        (status = 500, description = "Internal error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn list_items<F: UnitOfWorkFactory>(
    Items: Items,
    State(state): State<AppState<F>>,
) -> ApiResult<Json<Vec<ItemDto>>> {
    let mut items = state.item_service().await?;
    let found = items.list_items().await?;
    Ok(Json(found))
}

/// Creates a new item.
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = ItemDto,
    responses(
        (status = 201, description = "Created", body = ItemDto),
        (status = 400, description = "Bad Request", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn create_item<F: UnitOfWorkFactory>(
    Items: Items,
    State(state): State<AppState<F>>,
    Json(item): Json<ItemDto>,
) -> ApiResult<(StatusCode, Json<ItemDto>)> {
    let mut items = state.item_service().await?;
    let created = items.create_item(item).await?;
    items.commit().await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Gets an item.
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "Ok", body = ItemDto),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id))]
pub async fn get_item<F: UnitOfWorkFactory>(
    ItemsId(id): ItemsId,
    State(state): State<AppState<F>>,
) -> ApiResult<Json<ItemDto>> {
    let mut items = state.item_service().await?;
    let item = items
        .get_item_by_id(id)
        .await?
        .ok_or(ClientError::NotFound)?;
    Ok(Json(item))
}

/// Updates an item.
///
/// A non-zero `id` in the body must match the path, which is checked before
/// the item is looked up.
#[utoipa::path(
    put,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemDto,
    responses(
        (status = 204, description = "No Content"),
        (status = 400, description = "Bad Request", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id))]
pub async fn update_item<F: UnitOfWorkFactory>(
    ItemsId(id): ItemsId,
    State(state): State<AppState<F>>,
    Json(item): Json<ItemDto>,
) -> ApiResult<StatusCode> {
    if item.id != 0 && item.id != id {
        return Err(ClientError::BadRequest(format!(
            "id {} in body does not match id {} in path",
            item.id, id
        )))?;
    }
    let mut items = state.item_service().await?;
    items.update_item(id, item).await?;
    items.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes an item.
#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 204, description = "No Content"),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Internal Server Error", body = ErrorBody),
    )
)]
#[instrument(skip_all, fields(id))]
pub async fn delete_item<F: UnitOfWorkFactory>(
    ItemsId(id): ItemsId,
    State(state): State<AppState<F>>,
) -> ApiResult<StatusCode> {
    let mut items = state.item_service().await?;
    items.delete_item(id).await?;
    items.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
