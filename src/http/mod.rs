//! HTTP API over the application services (axum).

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use server::{build_router, serve};
