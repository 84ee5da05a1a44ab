//! Text encoder ports.
//!
//! An [`EncoderModel`] is the opaque model itself (hashing, remote service,
//! ...). A [`TextEncoder`] is what services call: it validates input and
//! guarantees every returned vector is unit length with the right dimension.

use async_trait::async_trait;

use crate::domain::errors::ServiceResult;
use crate::domain::models::EmbeddingVector;

/// Raw embedding model.
#[async_trait]
pub trait EncoderModel: Send + Sync {
    /// Model identifier (e.g., "BGE-m3").
    fn name(&self) -> &str;

    /// Output dimension.
    fn dimension(&self) -> usize;

    /// Encode a non-empty batch. Output vectors need not be normalized.
    async fn encode(&self, texts: &[String]) -> ServiceResult<Vec<Vec<f32>>>;
}

/// Normalizing encoder used by the retrieval path.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Embed `texts`, one vector per input in the same order.
    ///
    /// # Errors
    /// * `ModelUnavailable` - no model installed yet
    /// * `EncodingFailed` - empty input, or the model returned the wrong count or dimension
    async fn embed(&self, texts: &[String]) -> ServiceResult<Vec<EmbeddingVector>>;

    /// Whether a model is installed and ready to serve.
    fn is_ready(&self) -> bool;

    fn model_name(&self) -> String;

    fn dimension(&self) -> usize;
}
