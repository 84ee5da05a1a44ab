//! Service errors for the retrieval and generation core.
//!
//! Every failure maps to one stable [`ServiceError::category`] so transport
//! layers can report it without inspecting the message. A missing structured
//! object after extraction is *not* an error and never appears here.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the encoder, store, backends and services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing request fields. Caller-fixable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The encoder or generator has not finished initializing.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// The encoder rejected its input or produced malformed output.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Remote generation backend unreachable or returned a non-success status.
    #[error("Backend error: {0}")]
    BackendError(String),

    /// No store connection became available within the acquire timeout.
    #[error("Connection pool timed out after {0:?}")]
    PoolTimeout(Duration),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Stable, machine-readable category for this error.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::EncodingFailed(_) => "encoding_failed",
            Self::BackendError(_) => "backend_error",
            Self::PoolTimeout(_) => "pool_timeout",
            Self::Database(_) => "database_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable(_) | Self::PoolTimeout(_) | Self::BackendError(_)
        )
    }

    /// Map a sqlx error, using `acquire_timeout` for pool exhaustion.
    pub fn from_sqlx(err: sqlx::Error, acquire_timeout: Duration) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::PoolTimeout(acquire_timeout),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::BackendError(format!("Malformed backend payload: {err}"))
    }
}
