//! APIs for getting information about the application.

use crate::infra::extract::Json;
use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The info API endpoints.
pub fn routes<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/info", get(info))
}

/// Application information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppInfo {
    /// The application name.
    #[schema(example = "item-tracker")]
    name: String,
    /// The application version.
    #[schema(example = "0.1.0")]
    version: String,
}

impl AppInfo {
    /// The application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The application version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Returns application information.
#[utoipa::path(
    get,
    path = "/api/info",
    responses(
        (status = 200, description = "Success", body = AppInfo),
    )
)]
pub async fn info() -> Json<AppInfo> {
    Json(AppInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
