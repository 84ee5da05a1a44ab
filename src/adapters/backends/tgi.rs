//! Text Generation Inference `/generate` backend.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::http::{build_client, is_truthy, post_json, probe, require_base_url, value_to_text};
use crate::domain::errors::ServiceResult;
use crate::domain::models::GenerationParams;
use crate::domain::ports::GenerationBackend;

pub struct TgiBackend {
    client: reqwest::Client,
    base_url: String,
}

impl TgiBackend {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: require_base_url("tgi", base_url)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    inputs: &'a str,
    parameters: Parameters<'a>,
}

#[derive(Debug, Serialize)]
struct Parameters<'a> {
    temperature: f32,
    max_new_tokens: u32,
    top_p: f32,
    repetition_penalty: f32,
    stop: &'a [String],
    return_full_text: bool,
}

/// TGI usually answers with `[{"generated_text": ...}]`, sometimes a bare object.
fn response_text(data: &Value) -> String {
    let generated = |value: &Value| value.get("generated_text").filter(|v| is_truthy(v)).map(value_to_text);

    match data {
        Value::Array(items) if !items.is_empty() => generated(&items[0]).unwrap_or_default(),
        other => generated(other).unwrap_or_else(|| value_to_text(other)),
    }
}

#[async_trait]
impl GenerationBackend for TgiBackend {
    fn name(&self) -> &'static str {
        "tgi"
    }

    async fn complete(&self, prompt: &str, params: &GenerationParams) -> ServiceResult<String> {
        let payload = GeneratePayload {
            inputs: prompt,
            parameters: Parameters {
                temperature: params.temperature,
                max_new_tokens: params.max_new_tokens,
                top_p: params.top_p,
                repetition_penalty: params.repetition_penalty,
                stop: &params.stop,
                return_full_text: false,
            },
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
    fn test_response_text_shapes() {
        assert_eq!(response_text(&json!([{"generated_text": "list"}])), "list");
        assert_eq!(response_text(&json!([{"details": {}}])), "");
        assert_eq!(response_text(&json!({"generated_text": "obj"})), "obj");
        assert_eq!(response_text(&json!({"error": "x"})), r#"{"error":"x"}"#);
    }
}
