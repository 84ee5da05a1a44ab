//! Domain layer for tutorgate
//!
//! Core models, the service error type, and the port traits adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ServiceError, ServiceResult};
