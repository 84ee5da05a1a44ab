//! Service layer: retrieval, prompt building, generation and health.

pub mod extractor;
pub mod generation_gateway;
pub mod health_service;
pub mod prompt_builder;
pub mod retrieval_service;

pub use generation_gateway::GenerationGateway;
pub use health_service::HealthService;
pub use retrieval_service::RetrievalService;
