use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ServiceError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Not found")]
    NotFound,
}

/// Error body: `{"error": category, "detail": message}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::InvalidArgument(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::ModelUnavailable(_) | ServiceError::PoolTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::EncodingFailed(_) => StatusCode::BAD_REQUEST,
                ServiceError::BackendError(_) => StatusCode::BAD_GATEWAY,
                ServiceError::Database(_) | ServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Service(err) => err.category(),
            Self::MalformedBody(_) => "invalid_argument",
            Self::NotFound => "not_found",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: self.error_code().to_string(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
