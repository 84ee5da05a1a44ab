//! Generation gateway wired through an application context.

mod common;

use std::sync::Arc;

use common::RecordingBackend;
use tutorgate::domain::models::{FeedbackRequest, GenerationRequest};
use tutorgate::ServiceError;

#[tokio::test]
async fn test_mock_backend_mcq_is_parsed() {
    common::setup_test_logging();
    let ctx = common::mock_context().await;

    let request = GenerationRequest {
        style: "mcq".to_string(),
        ..GenerationRequest::for_topic("Pythagorean theorem")
    };
    let response = ctx.gateway.generate(&request).await.unwrap();

    let parsed = response.parsed_json.expect("mock MCQ payload should parse");
    assert_eq!(parsed["answer"], "B");
    assert_eq!(parsed["options"].as_array().map(Vec::len), Some(4));
    assert_eq!(response.model_id, ctx.config.backend.model_id);
    assert!(response.prompt.contains("Pythagorean theorem"));
}

#[tokio::test]
async fn test_rag_context_lands_in_prompt() {
    let backend = Arc::new(RecordingBackend::new(r#"{"question": "q", "answer": "a"}"#));
    let ctx = common::context_with_backend(backend.clone()).await;

    ctx.retrieval
        .ingest(&["Right triangles have one ninety degree angle".to_string()], "seed", None)
        .await
        .unwrap();

    let request = GenerationRequest::for_topic("right triangles");
    let response = ctx.gateway.generate_with_context(&request, &ctx.retrieval, 1).await.unwrap();

    assert_eq!(backend.calls(), 1);
    let sent = backend.last_prompt().unwrap();
    assert_eq!(sent, response.prompt);
    assert!(sent.contains("Reference material:"));
    assert!(sent.contains("[1] Right triangles have one ninety degree angle"));
    assert!(response.parsed_json.is_some());
}

#[tokio::test]
async fn test_explicit_prompt_reaches_backend_unchanged() {
    let backend = Arc::new(RecordingBackend::new(r#"{"question": "q", "answer": "a"}"#));
    let ctx = common::context_with_backend(backend.clone()).await;

    let raw = "  Line one\n  Line two\n\n";
    let request = GenerationRequest {
        prompt: Some(raw.to_string()),
        topic: Some("ignored topic".to_string()),
        ..GenerationRequest::default()
    };
    let response = ctx.gateway.generate(&request).await.unwrap();

    assert_eq!(backend.last_prompt().as_deref(), Some(raw));
    assert_eq!(response.prompt, raw);
}

#[tokio::test]
async fn test_invalid_requests_never_reach_backend() {
    let backend = Arc::new(RecordingBackend::new("unused"));
    let ctx = common::context_with_backend(backend.clone()).await;

    let empty = GenerationRequest::default();
    assert!(matches!(ctx.gateway.generate(&empty).await, Err(ServiceError::InvalidArgument(_))));

    let bad_tokens = GenerationRequest {
        max_new_tokens: 0,
        ..GenerationRequest::for_topic("t")
    };
    assert!(ctx.gateway.generate(&bad_tokens).await.is_err());

    let bad_rag = GenerationRequest::for_topic("t");
    assert!(ctx.gateway.generate_with_context(&bad_rag, &ctx.retrieval, 0).await.is_err());

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_unparseable_reply_is_not_an_error() {
    let backend = Arc::new(RecordingBackend::new("I cannot answer that in JSON, sorry."));
    let ctx = common::context_with_backend(backend).await;

    let response = ctx.gateway.generate(&GenerationRequest::for_topic("t")).await.unwrap();
    assert!(response.parsed_json.is_none());
    assert_eq!(response.generated_text, "I cannot answer that in JSON, sorry.");
}

#[tokio::test]
async fn test_summary_and_feedback_are_free_form() {
    let backend = Arc::new(RecordingBackend::new("Short and kind."));
    let ctx = common::context_with_backend(backend.clone()).await;

    let summary = ctx.gateway.summarize("A long lesson about fractions.").await.unwrap();
    assert_eq!(summary.summary, "Short and kind.");
    assert!(summary.prompt.contains("A long lesson about fractions."));

    let feedback = ctx
        .gateway
        .feedback(&FeedbackRequest {
            question: "1/2 + 1/4?".to_string(),
            user_answer: "2/6".to_string(),
            correct_answer: "3/4".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(feedback.feedback, "Short and kind.");
    assert!(feedback.prompt.contains("2/6"));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_health_reports_ok_with_mock_backend() {
    let ctx = common::mock_context().await;
    let report = ctx.health.check().await;

    assert_eq!(report.status, "ok");
    assert!(report.is_fully_healthy());
    assert_eq!(report.backend, "mock");
    assert_eq!(report.device, "cpu");
}
