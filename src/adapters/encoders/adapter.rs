//! Normalizing text encoder over an installable model slot.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::EmbeddingVector;
use crate::domain::ports::{EncoderModel, TextEncoder};

/// Wraps an [`EncoderModel`] and enforces the output contract.
///
/// The slot starts empty when the model is loaded in the background; calls
/// made before [`EncoderAdapter::install`] fail with `ModelUnavailable`.
pub struct EncoderAdapter {
    model_name: String,
    dimension: usize,
    slot: RwLock<Option<Arc<dyn EncoderModel>>>,
}

impl EncoderAdapter {
    /// Adapter with no model installed yet.
    pub fn empty(model_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_name: model_name.into(),
            dimension,
            slot: RwLock::new(None),
        }
    }

    /// Adapter serving `model` immediately.
    pub fn with_model(model: Arc<dyn EncoderModel>) -> Self {
        let adapter = Self::empty(model.name(), model.dimension());
        adapter.install(model);
        adapter
    }

    /// Fill (or replace) the model slot.
    pub fn install(&self, model: Arc<dyn EncoderModel>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(model = model.name(), dimension = model.dimension(), "encoder model installed");
        *slot = Some(model);
    }

    fn current(&self) -> Option<Arc<dyn EncoderModel>> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl TextEncoder for EncoderAdapter {
    async fn embed(&self, texts: &[String]) -> ServiceResult<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Err(ServiceError::EncodingFailed("no texts to embed".to_string()));
        }

        let model = self
            .current()
            .ok_or_else(|| ServiceError::ModelUnavailable(format!("encoder '{}' is not loaded", self.model_name)))?;

        let raw = model.encode(texts).await?;
        if raw.len() != texts.len() {
            return Err(ServiceError::EncodingFailed(format!(
                "model returned {} vectors for {} texts",
                raw.len(),
                texts.len()
            )));
        }

        raw.into_iter()
            .map(|values| {
                if values.len() == self.dimension {
                    Ok(EmbeddingVector::normalized(values))
                } else {
                    Err(ServiceError::EncodingFailed(format!(
                        "expected dimension {}, got {}",
                        self.dimension,
                        values.len()
                    )))
                }
            })
            .collect()
    }

    fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    fn model_name(&self) -> String {
        self.model_name.clone()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
