//! Prompt building, backend dispatch and structured-output extraction.

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::extractor;
use super::prompt_builder;
use super::retrieval_service::RetrievalService;
use crate::adapters::backends::BackendDispatcher;
use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::{
    FeedbackRequest, FeedbackResponse, GenerationParams, GenerationRequest, GenerationResponse,
    PromptSource, SummaryResponse,
};

const SUMMARY_TEMPERATURE: f32 = 0.5;
const FEEDBACK_TEMPERATURE: f32 = 0.7;

pub struct GenerationGateway {
    dispatcher: Arc<BackendDispatcher>,
}

impl GenerationGateway {
    pub fn new(dispatcher: Arc<BackendDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<BackendDispatcher> {
        &self.dispatcher
    }

    /// Generate one structured problem.
    ///
    /// Validation happens before anything is sent: a request with no usable
    /// text or out-of-range parameters never reaches the backend.
    pub async fn generate(&self, request: &GenerationRequest) -> ServiceResult<GenerationResponse> {
        let source = Self::checked_source(request)?;
        let prompt = Self::render(request, source, &[]);
        self.dispatch(request, prompt).await
    }

    /// Like [`GenerationGateway::generate`], grounding the prompt in retrieved passages.
    ///
    /// A verbatim `prompt` bypasses the builder, so no retrieval happens for it.
    pub async fn generate_with_context(
        &self,
        request: &GenerationRequest,
        retrieval: &RetrievalService,
        top_k: i64,
    ) -> ServiceResult<GenerationResponse> {
        let source = Self::checked_source(request)?;

        let context: Vec<String> = match source {
            PromptSource::Build(text) => retrieval
                .retrieve(text, top_k)
                .await?
                .into_iter()
                .map(|hit| hit.content)
                .collect(),
            PromptSource::Verbatim(_) => Vec::new(),
        };

        let prompt = Self::render(request, source, &context);
        self.dispatch(request, prompt).await
    }

    /// Free-form summary of `document`.
    #[instrument(skip(self, document), fields(document_len = document.len()))]
    pub async fn summarize(&self, document: &str) -> ServiceResult<SummaryResponse> {
        if document.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("Field required: document".to_string()));
        }

        let prompt = prompt_builder::build_summary(document.trim());
        let params = GenerationParams::free_form(SUMMARY_TEMPERATURE, self.dispatcher.default_stop());
        let summary = self.dispatcher.complete(&prompt, &params).await?;

        Ok(SummaryResponse {
            model_id: self.dispatcher.model_id().to_string(),
            prompt,
            summary,
        })
    }

    /// Tutor feedback on a wrong answer.
    #[instrument(skip(self, request))]
    pub async fn feedback(&self, request: &FeedbackRequest) -> ServiceResult<FeedbackResponse> {
        for (name, value) in [
            ("question", &request.question),
            ("user_answer", &request.user_answer),
            ("correct_answer", &request.correct_answer),
        ] {
            if value.trim().is_empty() {
                return Err(ServiceError::InvalidArgument(format!("Field required: {name}")));
            }
        }

        let prompt = prompt_builder::build_feedback(&request.question, &request.user_answer, &request.correct_answer);
        let params = GenerationParams::free_form(FEEDBACK_TEMPERATURE, self.dispatcher.default_stop());
        let feedback = self.dispatcher.complete(&prompt, &params).await?;

        Ok(FeedbackResponse {
            model_id: self.dispatcher.model_id().to_string(),
            prompt,
            feedback,
        })
    }

    fn checked_source(request: &GenerationRequest) -> ServiceResult<PromptSource<'_>> {
        request.validate()?;
        request.source()
    }

    fn render(request: &GenerationRequest, source: PromptSource<'_>, context: &[String]) -> String {
        match source {
            PromptSource::Verbatim(prompt) => prompt.to_string(),
            PromptSource::Build(text) => {
                prompt_builder::build_with_context(text, request.style(), request.strict_json, context)
            }
        }
    }

    #[instrument(
        skip(self, request, prompt),
        fields(request_id = %Uuid::new_v4(), backend = self.dispatcher.backend_name(), style = request.style().as_str())
    )]
    async fn dispatch(&self, request: &GenerationRequest, prompt: String) -> ServiceResult<GenerationResponse> {
        let params = request.params(self.dispatcher.default_stop());
        let generated_text = self.dispatcher.complete(&prompt, &params).await?;
        let parsed_json = extractor::extract(&generated_text);

        if parsed_json.is_none() {
            tracing::warn!(generated_len = generated_text.len(), "no JSON object recovered from backend output");
        } else {
            tracing::debug!("structured output recovered");
        }

        Ok(GenerationResponse {
            model_id: self.dispatcher.model_id().to_string(),
            prompt,
            generated_text,
            parsed_json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::backends::MockBackend;
    use crate::domain::models::BackendConfig;

    fn gateway() -> (GenerationGateway, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        let dispatcher = BackendDispatcher::with_backend(backend.clone(), &BackendConfig::default());
        (GenerationGateway::new(Arc::new(dispatcher)), backend)
    }

    #[tokio::test]
    async fn test_mcq_round_trip() {
        let (gateway, _) = gateway();
        let request = GenerationRequest {
            style: "mcq".into(),
            ..GenerationRequest::for_topic("Pythagorean theorem")
        };

        let response = gateway.generate(&request).await.unwrap();
        let parsed = response.parsed_json.unwrap();
        assert!(parsed.contains_key("question"));
        assert_eq!(parsed["options"].as_array().unwrap().len(), 4);
        assert!(parsed.contains_key("answer"));
        assert_eq!(response.model_id, "gecko-7b");
        assert!(response.prompt.contains("Topic: Pythagorean theorem"));
    }

    #[tokio::test]
    async fn test_empty_request_never_calls_backend() {
        let (gateway, backend) = gateway();
        let err = gateway.generate(&GenerationRequest::default()).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_params_never_call_backend() {
        let (gateway, backend) = gateway();
        let request = GenerationRequest {
            repetition_penalty: 0.1,
            ..GenerationRequest::for_topic("t")
        };

        assert!(gateway.generate(&request).await.is_err());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_verbatim_prompt_bypasses_builder() {
        let (gateway, _) = gateway();
        let request = GenerationRequest {
            prompt: Some("Write a question about primes.".into()),
            topic: Some("ignored".into()),
            ..Default::default()
        };

        let response = gateway.generate(&request).await.unwrap();
        assert_eq!(response.prompt, "Write a question about primes.");
    }

    #[tokio::test]
    async fn test_summarize_and_feedback() {
        let (gateway, backend) = gateway();

        let summary = gateway.summarize("Long document about triangles.").await.unwrap();
        assert!(summary.prompt.contains("Long document about triangles."));
        assert!(!summary.summary.is_empty());

        let feedback = gateway
            .feedback(&FeedbackRequest {
                question: "2+2?".into(),
                user_answer: "5".into(),
                correct_answer: "4".into(),
            })
            .await
            .unwrap();
        assert!(feedback.prompt.contains("User answer: 5"));
        assert_eq!(backend.call_count(), 2);

        assert!(matches!(gateway.summarize("  ").await, Err(ServiceError::InvalidArgument(_))));
        assert_eq!(backend.call_count(), 2);
    }
}
