//! OpenAI-compatible chat completions backend (LM Studio, Ollama proxies, ...).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::http::{build_client, post_json, probe, value_to_text};
use crate::domain::errors::ServiceResult;
use crate::domain::models::GenerationParams;
use crate::domain::ports::GenerationBackend;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// System message sent ahead of every prompt.
pub const SYSTEM_MESSAGE: &str = "You are an AI problem generator for MeQuest.";

pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: Option<&str>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> ServiceResult<Self> {
        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_OPENAI_BASE_URL)
            .to_string();

        Ok(Self {
            client: build_client(timeout)?,
            base_url,
            api_key: api_key.filter(|key| !key.is_empty()),
            model: model.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    top_p: f32,
    n: u32,
    max_tokens: u32,
    stop: &'a [String],
}

fn response_text(data: &Value) -> String {
    data.pointer("/choices/0/message/content")
        .map_or_else(|| value_to_text(data), value_to_text)
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str, params: &GenerationParams) -> ServiceResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_MESSAGE },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: params.temperature,
            top_p: params.top_p,
            n: 1,
            max_tokens: params.max_new_tokens,
            stop: &params.stop,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let data = post_json(&self.client, &url, &request, self.api_key.as_deref()).await?;
        Ok(response_text(&data))
    }

    async fn health_check(&self) -> ServiceResult<()> {
        probe(&self.client, &format!("{}/models", self.base_url), self.api_key.as_deref()).await
    }
}
