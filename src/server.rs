//! REST API implementation.
//!
//! # Examples
//!
//! Create an item, then read it back.
//!
//! ```no_run
//! # use item_tracker::feature::item::item_dto::ItemDto;
//! # async fn example() {
//! let url = item_tracker::server::spawn_app().await;
//! let client = reqwest::Client::new();
//! let new_item = ItemDto {
//!     name: "Test Item".to_string(),
//!     description: "Test Description".to_string(),
//!     ..Default::default()
//! };
//! let response = client.post(format!("{url}/items")).json(&new_item).send().await.unwrap();
//! assert_eq!(201, response.status());
//! let created = response.json::<ItemDto>().await.unwrap();
//! let found = reqwest::get(format!("{url}/items/{}", created.id)).await.unwrap();
//! assert_eq!(created, found.json::<ItemDto>().await.unwrap());
//! # }
//! ```

use crate::{
    feature::{info::info_api, item::item_api},
    infra::{
        config::{Config, ServerConfig, StoreBackend},
        database::{self, DbPool},
        error::{InternalError, PanicHandler},
        memory::MemoryStore,
        middleware::{log_request_response, MakeRequestIdSpan},
        openapi::ApiDoc,
        shutdown::shutdown_signal,
        state::AppState,
        unit_of_work::UnitOfWorkFactory,
    },
};
use axum::{error_handling::HandleErrorLayer, response::IntoResponse, Router};
use http::header::AUTHORIZATION;
use std::iter::once;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

/// Constructs the REST API routes.
pub fn api<F: UnitOfWorkFactory>(state: AppState<F>) -> Router {
    Router::new()
        .merge(info_api::routes())
        .merge(item_api::routes::<F>())
        .with_state(state)
}

/// Constructs the full axum application including middleware.
pub fn app<F: UnitOfWorkFactory>(state: AppState<F>, config: &ServerConfig) -> Router {
    // Fallible middleware from tower, mapped to infallible response with [`HandleErrorLayer`].
    let tower_middleware = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e| async move {
            InternalError::Other(format!("Tower middleware failed: {e}")).into_response()
        }))
        .concurrency_limit(config.concurrency_limit);

    Router::new()
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/api/redoc", ApiDoc::openapi()))
        .merge(RapiDoc::new("/api/openapi.json").path("/api/rapidoc"))
        .nest("/api", api(state))
        // Layers
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(axum::middleware::from_fn(log_request_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(MakeRequestIdSpan)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(()),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)))
        .layer(tower_middleware)
        .layer(CatchPanicLayer::custom(PanicHandler))
}

/// Serves the application until ctrl-c is pressed.
pub async fn run_app<F: UnitOfWorkFactory>(
    listener: TcpListener,
    state: AppState<F>,
    config: ServerConfig,
) -> std::io::Result<()> {
    let app = app(state, &config);

    tracing::info!("Starting axum on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Successfully shut down");
    Ok(())
}

/// Connects to the configured store and serves the application on `listener`.
pub async fn run(listener: TcpListener, config: Config) -> color_eyre::Result<()> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let db = database::init_db(&config.database);
            database::migrate(&db).await?;
            run_app(listener, AppState::new(db), config.server).await?;
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store, items are lost on shutdown");
            run_app(listener, AppState::new(MemoryStore::new()), config.server).await?;
        }
    }
    Ok(())
}

/// Spawn a server on a random port backed by the in-memory store.
pub async fn spawn_app() -> String {
    spawn_app_with(MemoryStore::new()).await
}

/// Spawn a server on a random port with a custom database.
pub async fn spawn_app_with_db(db: DbPool) -> String {
    spawn_app_with(db).await
}

async fn spawn_app_with<F: UnitOfWorkFactory>(units: F) -> String {
    let address = "127.0.0.1";
    let listener = TcpListener::bind(format!("{address}:0")).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = crate::infra::config::load_config().unwrap();
    tokio::spawn(run_app(listener, AppState::new(units), config.server));
    format!("http://{address}:{port}/api")
}
