use async_trait::async_trait;

use crate::domain::errors::ServiceResult;
use crate::domain::models::GenerationParams;

/// A text-generation service speaking one wire protocol.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name (e.g., "mock", "vllm", "tgi", "openai").
    fn name(&self) -> &'static str;

    /// Produce raw text for `prompt`.
    ///
    /// Transport failures and non-success statuses surface as `BackendError`.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> ServiceResult<String>;

    /// Cheap reachability probe. Defaults to always healthy.
    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }
}
