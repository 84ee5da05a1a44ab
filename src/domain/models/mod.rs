//! Domain models

pub mod config;
pub mod embedding;
pub mod generation;
pub mod health;

pub use config::{
    BackendConfig, BackendKind, Config, DatabaseConfig, EncoderConfig, EncoderKind, LogFormat,
    LoggingConfig, RetrievalConfig, RotationPolicy, ServerConfig,
};
pub use embedding::{EmbeddingVector, NewEmbedding, SimilarityResult, StoredEmbedding};
pub use generation::{
    FeedbackRequest, FeedbackResponse, GenerationParams, GenerationRequest, GenerationResponse,
    PromptSource, Style, SummaryResponse, MAX_NEW_TOKENS_LIMIT,
};
pub use health::HealthReport;
