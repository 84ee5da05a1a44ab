//! Embed-then-search retrieval.

use std::sync::Arc;
use tracing::instrument;

use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::{EmbeddingVector, NewEmbedding, SimilarityResult};
use crate::domain::ports::{EmbeddingStore, TextEncoder};

/// Retrieval over a text encoder and an embedding store.
///
/// Calls run sequentially and propagate failures untouched; only
/// [`RetrievalService::is_healthy`] turns them into a boolean.
pub struct RetrievalService {
    encoder: Arc<dyn TextEncoder>,
    store: Arc<dyn EmbeddingStore>,
}

impl RetrievalService {
    pub fn new(encoder: Arc<dyn TextEncoder>, store: Arc<dyn EmbeddingStore>) -> Self {
        Self { encoder, store }
    }

    pub fn encoder(&self) -> &Arc<dyn TextEncoder> {
        &self.encoder
    }

    pub fn store(&self) -> &Arc<dyn EmbeddingStore> {
        &self.store
    }

    /// Embed `texts` with the configured encoder.
    pub async fn embed(&self, texts: &[String]) -> ServiceResult<Vec<EmbeddingVector>> {
        self.encoder.embed(texts).await
    }

    /// Nearest stored content to `query`.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn retrieve(&self, query: &str, top_k: i64) -> ServiceResult<Vec<SimilarityResult>> {
        if top_k <= 0 {
            return Err(ServiceError::InvalidArgument(format!("top_k must be positive, got {top_k}")));
        }

        let vectors = self.encoder.embed(&[query.to_string()]).await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::EncodingFailed("encoder returned no vector".to_string()))?;

        let results = self.store.search(query_vector.as_slice(), top_k).await?;
        tracing::debug!(hits = results.len(), "retrieval complete");
        Ok(results)
    }

    /// Nearest stored content to a pre-computed vector.
    pub async fn search_vector(&self, vector: &[f32], top_k: i64) -> ServiceResult<Vec<SimilarityResult>> {
        if vector.is_empty() {
            return Err(ServiceError::InvalidArgument("query_vector must not be empty".to_string()));
        }
        self.store.search(vector, top_k).await
    }

    /// Embed and store a batch of texts, returning the new row ids.
    #[instrument(skip(self, texts), fields(count = texts.len(), source = %source))]
    pub async fn ingest(&self, texts: &[String], source: &str, ref_id: Option<i64>) -> ServiceResult<Vec<i64>> {
        let vectors = self.encoder.embed(texts).await?;
        let model_name = self.encoder.model_name();

        let rows = texts
            .iter()
            .zip(vectors)
            .map(|(content, embedding)| NewEmbedding {
                content: content.clone(),
                embedding,
                model_name: model_name.clone(),
                source: source.to_string(),
                ref_id,
            })
            .collect();

        let ids = self.store.insert_batch(rows).await?;
        tracing::info!(inserted = ids.len(), "ingested texts");
        Ok(ids)
    }

    /// Encoder ready and store reachable.
    pub async fn is_healthy(&self) -> bool {
        self.encoder.is_ready() && self.store.ping().await.is_ok()
    }
}
