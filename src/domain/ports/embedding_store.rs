use async_trait::async_trait;

use crate::domain::errors::ServiceResult;
use crate::domain::models::{NewEmbedding, SimilarityResult};

/// Persistence interface for embeddings and nearest-neighbor search.
///
/// Every call checks one connection out of a bounded pool and returns it on
/// all exit paths. Exhausted pools fail with `PoolTimeout`.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Insert one row, returning its id.
    async fn insert(&self, embedding: NewEmbedding) -> ServiceResult<i64>;

    /// Insert rows in a single transaction, returning ids in input order.
    async fn insert_batch(&self, embeddings: Vec<NewEmbedding>) -> ServiceResult<Vec<i64>>;

    /// The `top_k` stored rows closest to `query` by Euclidean distance.
    ///
    /// Ascending by distance; equal distances keep insertion order. Rows whose
    /// dimension differs from the query are skipped.
    ///
    /// # Errors
    /// * `InvalidArgument` - `top_k <= 0`
    async fn search(&self, query: &[f32], top_k: i64) -> ServiceResult<Vec<SimilarityResult>>;

    /// Number of stored rows.
    async fn count(&self) -> ServiceResult<i64>;

    /// Liveness probe.
    async fn ping(&self) -> ServiceResult<()>;
}
