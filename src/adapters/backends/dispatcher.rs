//! Backend selection and serialized dispatch.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::{MockBackend, OpenAiBackend, TgiBackend, VllmBackend};
use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::{BackendConfig, BackendKind, GenerationParams};
use crate::domain::ports::GenerationBackend;

/// Routes every completion to the one backend chosen at startup.
///
/// Invocations share a semaphore of `max_in_flight` permits; a permit is held
/// for the whole call and released on every exit path, timeouts included.
pub struct BackendDispatcher {
    backend: Arc<dyn GenerationBackend>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    model_id: String,
    default_stop: Vec<String>,
}

impl BackendDispatcher {
    /// Build the backend selected by `config.kind`.
    ///
    /// # Errors
    /// `Config` when a remote backend has no usable base URL.
    pub fn from_config(config: &BackendConfig) -> ServiceResult<Self> {
        let timeout = config.timeout();
        let base_url = config.base_url.as_deref();

        let backend: Arc<dyn GenerationBackend> = match config.kind {
            BackendKind::Mock => Arc::new(MockBackend::new()),
            BackendKind::Vllm => Arc::new(VllmBackend::new(base_url, timeout)?),
            BackendKind::Tgi => Arc::new(TgiBackend::new(base_url, timeout)?),
            BackendKind::Openai => Arc::new(OpenAiBackend::new(
                base_url,
                config.api_key.clone(),
                &config.chat_model,
                timeout,
            )?),
        };

        tracing::info!(
            backend = backend.name(),
            model_id = %config.model_id,
            max_in_flight = config.max_in_flight,
            "generation backend selected"
        );
        Ok(Self::with_backend(backend, config))
    }

    /// Wrap an already-built backend (tests, embedding in other binaries).
    pub fn with_backend(backend: Arc<dyn GenerationBackend>, config: &BackendConfig) -> Self {
        Self {
            backend,
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            timeout: config.timeout(),
            model_id: config.model_id.clone(),
            default_stop: config.stop.clone(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn default_stop(&self) -> &[String] {
        &self.default_stop
    }

    /// Permits currently free.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run one completion under the in-flight limit and the configured timeout.
    pub async fn complete(&self, prompt: &str, params: &GenerationParams) -> ServiceResult<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ServiceError::ModelUnavailable("generation backend is shutting down".to_string()))?;

        match tokio::time::timeout(self.timeout, self.backend.complete(prompt, params)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(backend = self.backend.name(), timeout = ?self.timeout, "generation timed out");
                Err(ServiceError::BackendError(format!(
                    "{} backend timed out after {:?}",
                    self.backend.name(),
                    self.timeout
                )))
            }
        }
    }

    pub async fn health_check(&self) -> ServiceResult<()> {
        self.backend.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Style;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn params() -> GenerationParams {
        GenerationParams {
            max_new_tokens: 16,
            temperature: 0.2,
            top_p: 0.9,
            repetition_penalty: 1.1,
            stop: vec![],
            style: Style::Qa,
        }
    }

    /// Tracks the peak number of overlapping calls.
    #[derive(Default)]
    struct SlowBackend {
        active: AtomicUsize,
        peak: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl GenerationBackend for SlowBackend {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn complete(&self, _prompt: &str, _params: &GenerationParams) -> ServiceResult<String> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok("done".to_string())
        }
    }

    #[test]
    fn test_remote_backend_without_url_fails() {
        for kind in [BackendKind::Vllm, BackendKind::Tgi] {
            let config = BackendConfig { kind, ..Default::default() };
            assert!(matches!(BackendDispatcher::from_config(&config), Err(ServiceError::Config(_))));
        }

        let config = BackendConfig { kind: BackendKind::Openai, ..Default::default() };
        assert!(BackendDispatcher::from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_single_slot_serializes_calls() {
        let backend = Arc::new(SlowBackend { delay: Duration::from_millis(20), ..Default::default() });
        let dispatcher = Arc::new(BackendDispatcher::with_backend(backend.clone(), &BackendConfig::default()));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move { dispatcher.complete("p", &params()).await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "done");
        }

        assert_eq!(backend.peak.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.available_slots(), 1);
    }

    #[tokio::test]
    async fn test_timeout_releases_permit() {
        let backend = Arc::new(SlowBackend { delay: Duration::from_secs(5), ..Default::default() });
        let config = BackendConfig { timeout_secs: 0, ..Default::default() };
        let dispatcher = BackendDispatcher::with_backend(backend, &config);

        let err = dispatcher.complete("p", &params()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BackendError(_)));
        assert_eq!(dispatcher.available_slots(), 1);
    }
}
