use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::DomainError;
use crate::openlibrary::LookupError;
use crate::services::CoverError;

/// Error returned by HTTP handlers, rendered as `{"error": …}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        ApiError::Domain(e.into())
    }
}

impl From<CoverError> for ApiError {
    fn from(e: CoverError) -> Self {
        ApiError::Domain(e.into())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Domain(DomainError::NotFound) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Book not found" }),
            ),
            ApiError::Domain(DomainError::Validation(fields)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            ApiError::Domain(DomainError::External(msg)) => {
                tracing::warn!("Lookup failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": format!("Lookup failed: {}", msg) }),
                )
            }
            ApiError::Domain(DomainError::UnsupportedMedia(msg)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, json!({ "error": msg }))
            }
            ApiError::Domain(DomainError::Storage(msg)) => {
                tracing::error!("Cover storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            ApiError::Domain(e @ (DomainError::Database(_) | DomainError::Internal(_))) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": e.to_string() }),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}
