//! HTTP client for an external embedding service.
//!
//! Speaks `POST {url}/embed` with `{"texts": [...]}` and expects
//! `{"embeddings": [[...], ...]}` back, one vector per text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::adapters::backends::http::build_client;
use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::ports::EncoderModel;

pub struct RemoteEncoder {
    client: reqwest::Client,
    base_url: String,
    model_name: String,
    dimension: usize,
}

impl RemoteEncoder {
    pub fn new(
        base_url: impl Into<String>,
        model_name: impl Into<String>,
        dimension: usize,
        timeout: Duration,
    ) -> ServiceResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model_name: model_name.into(),
            dimension,
        })
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EncoderModel for RemoteEncoder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, texts: &[String]) -> ServiceResult<Vec<Vec<f32>>> {
        let url = format!("{}/embed", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { texts })
            .send()
            .await
            .map_err(|e| ServiceError::ModelUnavailable(format!("Embedding service unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(ServiceError::EncodingFailed(format!(
                "Embedding service returned {status}: {body}"
            )));
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::EncodingFailed(format!("Failed to parse embedding response: {e}")))?;

        Ok(result.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_encode_posts_texts() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/embed")
            .match_body(mockito::Matcher::Json(serde_json::json!({"texts": ["a", "b"]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embeddings": [[1.0, 0.0], [0.0, 2.0]]}"#)
            .create_async()
            .await;

        let encoder = RemoteEncoder::new(server.url(), "BGE-m3", 2, Duration::from_secs(5)).unwrap();
        let vectors = encoder.encode(&["a".to_string(), "b".to_string()]).await.unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_encoding_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/embed")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let encoder = RemoteEncoder::new(format!("{}/", server.url()), "BGE-m3", 2, Duration::from_secs(5)).unwrap();
        let err = encoder.encode(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::EncodingFailed(ref msg) if msg.contains("boom")));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_model_unavailable() {
        let encoder = RemoteEncoder::new("http://127.0.0.1:9", "BGE-m3", 2, Duration::from_millis(500)).unwrap();
        let err = encoder.encode(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::ModelUnavailable(_)));
    }
}
