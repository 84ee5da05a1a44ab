//! vLLM-style `/generate` backend.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::http::{build_client, is_truthy, post_json, probe, require_base_url, value_to_text};
use crate::domain::errors::ServiceResult;
use crate::domain::models::GenerationParams;
use crate::domain::ports::GenerationBackend;

pub struct VllmBackend {
    client: reqwest::Client,
    base_url: String,
}

impl VllmBackend {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: require_base_url("vllm", base_url)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    repetition_penalty: f32,
    stop: &'a [String],
}

/// First truthy of `text`, `generated_text`, `output`; otherwise the whole reply.
fn response_text(data: &Value) -> String {
    ["text", "generated_text", "output"]
        .iter()
        .filter_map(|key| data.get(key))
        .find(|value| is_truthy(value))
        .map_or_else(|| value_to_text(data), value_to_text)
}

#[async_trait]
impl GenerationBackend for VllmBackend {
    fn name(&self) -> &'static str {
        "vllm"
    }

    async fn complete(&self, prompt: &str, params: &GenerationParams) -> ServiceResult<String> {
        let payload = GeneratePayload {
            prompt,
            temperature: params.temperature,
            max_tokens: params.max_new_tokens,
            top_p: params.top_p,
            repetition_penalty: params.repetition_penalty,
            stop: &params.stop,
        };

        let url = format!("{}/generate", self.base_url);
        let data = post_json(&self.client, &url, &payload, None).await?;
        Ok(response_text(&data))
    }

    async fn health_check(&self) -> ServiceResult<()> {
        probe(&self.client, &format!("{}/health", self.base_url), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_text_field_priority() {
        assert_eq!(response_text(&json!({"text": "a", "output": "b"})), "a");
        assert_eq!(response_text(&json!({"text": "", "generated_text": "g"})), "g");
        assert_eq!(response_text(&json!({"output": "o"})), "o");
        assert_eq!(response_text(&json!({"other": 1})), r#"{"other":1}"#);
    }

    #[test]
    fn test_missing_url_is_config_error() {
        assert!(VllmBackend::new(None, Duration::from_secs(1)).is_err());
    }
}
