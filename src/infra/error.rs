//! Types for reporting errors that happened during a request.
//!
//! If your function interacts with the store or enforces a business rule,
//! you likely want to return an [`ApiResult`].

use super::extract::Json;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::HeaderValue,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::ResponseForPanic;
use utoipa::ToSchema;

/// A standard error response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// A description of the error.
    #[schema(example = "Item not found.")]
    message: String,
    /// When the error happened.
    timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub(crate) fn new(message: String) -> Self {
        Self {
            message,
            timestamp: Utc::now(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// When the error happened.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// An error from our API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An error caused by the client.
    #[error("{0}")]
    ClientError(#[from] ClientError),
    /// A business rule was violated.
    #[error("{0}")]
    DomainError(#[from] DomainError),
    /// An internal error.
    #[error("{0}")]
    InternalError(#[from] InternalError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::ClientError(e) => e.into_response(),
            ApiError::DomainError(e) => {
                tracing::warn!("domain error: {}", e);
                e.into_response()
            }
            ApiError::InternalError(e) => {
                tracing::error!("internal error: {}", e);
                e.into_response()
            }
        }
    }
}

/// The result of calling API-related functions.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => ApiError::ClientError(ClientError::NotFound),
            sqlx::Error::Database(e) if e.constraint().is_some() => {
                ApiError::ClientError(ClientError::Conflict)
            }
            e => ApiError::InternalError(InternalError::SqlxError(e)),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for ApiError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        ApiError::InternalError(InternalError::MigrateError(e))
    }
}

/// Errors caused by the client.
/// The client can do something to fix these.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Input validation failed, or some illegal operation was attempted.
    #[error("{0}")]
    BadRequest(String),
    /// The resource was not found.
    #[error("not found")]
    NotFound,
    /// The resource already exists.
    #[error("conflict")]
    Conflict,
    /// Custom error.
    #[error("{1}")]
    Custom(StatusCode, String),
}

impl Default for ClientError {
    fn default() -> Self {
        Self::BadRequest("Bad Request".to_string())
    }
}

impl From<JsonRejection> for ClientError {
    fn from(value: JsonRejection) -> Self {
        ClientError::Custom(value.status(), value.body_text())
    }
}

impl From<PathRejection> for ClientError {
    fn from(value: PathRejection) -> Self {
        ClientError::Custom(value.status(), value.body_text())
    }
}

impl IntoResponse for ClientError {
    fn into_response(self) -> axum::response::Response {
        let msg = self.to_string();
        let status = match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Custom(status, _) => status,
        };
        (status, Json(ErrorBody::new(msg))).into_response()
    }
}

/// Violations of business rules.
/// Raised by services before touching the store, never by the store itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A mutation targeted an item that does not exist.
    #[error("Item not found.")]
    ItemNotFound,
}

impl IntoResponse for DomainError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::ItemNotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

/// An internal error.
/// The client cannot do anything about this.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// An [`sqlx`] error.
    #[error("{0}")]
    SqlxError(#[from] sqlx::Error),
    /// Running migrations failed.
    #[error("migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    /// A lock guarding shared state was poisoned.
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
    /// Other miscellaneous errors.
    #[error("{0}")]
    Other(String),
}

impl IntoResponse for InternalError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::SqlxError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut response =
            (status, Json(ErrorBody::new("internal error".to_string()))).into_response();
        response
            .headers_mut()
            .insert("Retry-After", HeaderValue::from_static("5"));
        response
    }
}

/// A handler for converting panics into proper responses for the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanicHandler;

impl ResponseForPanic for PanicHandler {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(
        &mut self,
        _: Box<dyn std::any::Any + Send + 'static>,
    ) -> http::Response<Self::ResponseBody> {
        ApiError::InternalError(InternalError::Other("Panic".to_string())).into_response()
    }
}
