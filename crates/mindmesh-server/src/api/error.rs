//! API error type and its JSON rendering

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mindmesh_core::{EmbeddingError, ServiceError, StorageError};

/// Body text for any unexpected failure
pub const INTERNAL_ERROR_DETAIL: &str = "An internal server error occurred";

/// Errors returned by handlers, rendered as `{"detail": ...}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Note not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    /// The embedding model could not be loaded
    #[error("Failed to initialize search model")]
    ModelInit(String),
    #[error("An internal server error occurred")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelInit(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) | ServiceError::Storage(StorageError::NotFound(_)) => {
                ApiError::NotFound
            }
            ServiceError::InvalidInput(msg) => ApiError::Validation(msg),
            ServiceError::Embedding(EmbeddingError::ModelInit(msg)) => ApiError::ModelInit(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::ModelInit(cause) => {
                tracing::error!("Error initializing model: {}", cause);
            }
            ApiError::Internal(cause) => {
                tracing::error!("Request failed: {}", cause);
            }
            ApiError::NotFound | ApiError::Validation(_) => {}
        }

        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
