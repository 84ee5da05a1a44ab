//! Health aggregation when parts of the stack are down.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use tutorgate::adapters::backends::{BackendDispatcher, MockBackend};
use tutorgate::adapters::encoders::EncoderAdapter;
use tutorgate::http::build_router;
use tutorgate::AppContext;

fn dispatcher(config: &tutorgate::Config) -> Arc<BackendDispatcher> {
    Arc::new(BackendDispatcher::with_backend(Arc::new(MockBackend::new()), &config.backend))
}

#[tokio::test]
async fn test_closed_store_reports_degraded() {
    common::setup_test_logging();
    let config = common::test_config();
    let store = common::memory_store().await;
    let ctx = AppContext::from_parts(config.clone(), common::hashing_encoder(), store.clone(), dispatcher(&config));

    store.pool().close().await;
    let report = ctx.health.check().await;

    assert!(report.model_loaded);
    assert!(!report.db_connected);
    assert_eq!(report.status, "degraded");
    assert!(!report.is_fully_healthy());
}

#[tokio::test]
async fn test_unloaded_encoder_reports_degraded() {
    let config = common::test_config();
    let encoder = Arc::new(EncoderAdapter::empty("BGE-m3", common::TEST_DIMENSION));
    let ctx = AppContext::from_parts(config.clone(), encoder, common::memory_store().await, dispatcher(&config));

    let report = ctx.health.check().await;

    assert!(!report.model_loaded);
    assert!(report.db_connected);
    assert_eq!(report.status, "degraded");
    assert_eq!(report.encoder, "BGE-m3");
}

#[tokio::test]
async fn test_health_route_stays_ok_when_degraded() {
    let config = common::test_config();
    let store = common::memory_store().await;
    let ctx = AppContext::from_parts(config.clone(), common::hashing_encoder(), store.clone(), dispatcher(&config));
    store.pool().close().await;

    let response = build_router(ctx)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db_connected"], false);
}
