//! Shared HTTP plumbing for the remote backends.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::domain::errors::{ServiceError, ServiceResult};

pub(crate) fn build_client(timeout: Duration) -> ServiceResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Config(format!("Failed to build HTTP client: {e}")))
}

pub(crate) fn require_base_url(backend: &str, base_url: Option<&str>) -> ServiceResult<String> {
    base_url
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ServiceError::Config(format!("backend.base_url is not set for {backend} backend")))
}

/// POST `body` as JSON and decode the JSON reply.
///
/// Transport failures and non-2xx statuses become `BackendError` carrying the
/// status and response body.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
    bearer: Option<&str>,
) -> ServiceResult<Value> {
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::BackendError(format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read response body".to_string());
        return Err(ServiceError::BackendError(format!("{url} returned {status}: {body}")));
    }

    response
        .json()
        .await
        .map_err(|e| ServiceError::BackendError(format!("Failed to parse response from {url}: {e}")))
}

/// GET `url` and require a 2xx status.
pub(crate) async fn probe(client: &reqwest::Client, url: &str, bearer: Option<&str>) -> ServiceResult<()> {
    let mut request = client.get(url);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::BackendError(format!("health probe to {url} failed: {e}")))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(ServiceError::BackendError(format!(
            "health probe to {url} returned {}",
            response.status()
        )))
    }
}

/// Render a JSON value the way it should appear as raw generated text.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON truthiness: absent, null, false, 0, "" and empty containers are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
