// ABOUTME: Error responses returned by the petstore HTTP API.
// ABOUTME: Maps store errors and request problems onto status codes and JSON bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use petstore_store::StoreError;
use serde::Serialize;

/// A request failure, rendered as `{"error": ..., "message": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotFound,
    BadRequest,
    InvalidUrl,
    InvalidResource(Vec<String>),
    Internal,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    message: Vec<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::InvalidUrl => StatusCode::BAD_REQUEST,
            ApiError::InvalidResource(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound => "resource not found",
            ApiError::BadRequest => "bad request",
            ApiError::InvalidUrl => "invalid url",
            ApiError::InvalidResource(_) => "invalid resource",
            ApiError::Internal => "internal error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PetNotFound(_) => ApiError::NotFound,
            other => {
                tracing::error!("store error: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.kind();
        let message = match self {
            ApiError::InvalidResource(message) => message,
            _ => Vec::new(),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Fallback for any unrouted path.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Fallback for a known path hit with a method it does not serve.
pub async fn bad_request() -> ApiError {
    ApiError::BadRequest
}
