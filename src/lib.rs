//! Tutorgate - retrieval and generation gateway for educational content
//!
//! Turns text into vectors, finds similar stored content, and produces
//! structured problems, summaries and feedback from one of several
//! interchangeable text-generation backends.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - **Domain Layer** (`domain`): models, `ServiceError`, port traits
//! - **Adapter Layer** (`adapters`): SQLite store, text encoders, generation backends
//! - **Service Layer** (`services`): retrieval, prompt building, extraction, gateway, health
//! - **Application Layer** (`application`): startup wiring (`AppContext`)
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **Transport** (`http`, `cli`): axum API and clap CLI
//!
//! # Example
//!
//! ```ignore
//! use tutorgate::application::AppContext;
//! use tutorgate::domain::models::{Config, GenerationRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = AppContext::from_config(Config::default()).await?;
//!     let response = ctx.gateway.generate(&GenerationRequest::for_topic("fractions")).await?;
//!     println!("{:?}", response.parsed_json);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::AppContext;
pub use domain::errors::{ServiceError, ServiceResult};
pub use domain::models::{
    Config, GenerationRequest, GenerationResponse, HealthReport, SimilarityResult, Style,
};
pub use services::{GenerationGateway, HealthService, RetrievalService};
