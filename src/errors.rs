use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::StorageError;

/// Domain-level failure of an accessor or the matching engine
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Model(ModelError::InvalidArgument(_)) => "bad_request",
            ApiError::Model(ModelError::NotFound(_)) => "not_found",
            ApiError::Model(ModelError::Conflict(_)) => "duplicate",
            ApiError::Model(ModelError::Storage(_)) => "internal_error",
            ApiError::Validation(_) => "validation_failed",
            ApiError::Unauthorized => "unauthorized",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Model(ModelError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Model(ModelError::InvalidArgument(_))
            | ApiError::Model(ModelError::Conflict(_))
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Model(ModelError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            ApiError::Model(ModelError::Storage(e)) => {
                tracing::error!("Storage failure: {}", e);
                "An unexpected storage error occurred".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}
