use std::sync::Arc;

use super::retrieval_service::RetrievalService;
use crate::adapters::backends::BackendDispatcher;
use crate::domain::models::HealthReport;

/// Liveness aggregation. Never fails: broken parts show up as `false`.
pub struct HealthService {
    retrieval: Arc<RetrievalService>,
    dispatcher: Arc<BackendDispatcher>,
    device: String,
}

impl HealthService {
    pub fn new(retrieval: Arc<RetrievalService>, dispatcher: Arc<BackendDispatcher>, device: impl Into<String>) -> Self {
        Self {
            retrieval,
            dispatcher,
            device: device.into(),
        }
    }

    pub async fn check(&self) -> HealthReport {
        let model_loaded = self.retrieval.encoder().is_ready();
        let db_connected = match self.retrieval.store().ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "store ping failed");
                false
            }
        };

        HealthReport {
            status: if model_loaded && db_connected { "ok" } else { "degraded" }.to_string(),
            model_loaded,
            db_connected,
            device: self.device.clone(),
            encoder: self.retrieval.encoder().model_name(),
            backend: self.dispatcher.backend_name().to_string(),
            model_id: self.dispatcher.model_id().to_string(),
        }
    }
}
