//! OpenAPI configuration.

use crate::feature::{
    info::info_api,
    item::{item_api, item_dto},
};
use utoipa::OpenApi;

/// OpenApi configuration.
#[derive(OpenApi)]
#[openapi(
    paths(
        info_api::info,
        item_api::list_items,
        item_api::create_item,
        item_api::get_item,
        item_api::update_item,
        item_api::delete_item,
    ),
    components(
        schemas(
            info_api::AppInfo,
            item_dto::ItemDto,
            crate::infra::error::ErrorBody
        )
    )
)]
#[derive(Clone, Copy, Debug)]
pub struct ApiDoc;
