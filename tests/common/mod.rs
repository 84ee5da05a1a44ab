//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use tutorgate::adapters::backends::{BackendDispatcher, MockBackend};
use tutorgate::adapters::encoders::{EncoderAdapter, HashingEncoder};
use tutorgate::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator, SqliteEmbeddingStore};
use tutorgate::domain::errors::ServiceResult;
use tutorgate::domain::models::{Config, GenerationParams};
use tutorgate::domain::ports::GenerationBackend;
use tutorgate::AppContext;

pub const TEST_DIMENSION: usize = 256;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create a temporary test database
///
/// Returns the path to a SQLite database file in a temporary directory.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let db_path = dir.path().join("test.db");
    (dir, db_path)
}

/// Setup test logging
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Config pointing at an in-memory database with a small hashing encoder
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.encoder.dimension = TEST_DIMENSION;
    config
}

/// Migrated in-memory store
pub async fn memory_store() -> Arc<SqliteEmbeddingStore> {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("Failed to run migrations");
    Arc::new(SqliteEmbeddingStore::new(pool))
}

pub fn hashing_encoder() -> Arc<EncoderAdapter> {
    Arc::new(EncoderAdapter::with_model(Arc::new(HashingEncoder::new("BGE-m3", TEST_DIMENSION))))
}

/// Application context over an in-memory store and `backend`
pub async fn context_with_backend(backend: Arc<dyn GenerationBackend>) -> AppContext {
    let config = test_config();
    let dispatcher = Arc::new(BackendDispatcher::with_backend(backend, &config.backend));
    AppContext::from_parts(config, hashing_encoder(), memory_store().await, dispatcher)
}

/// Application context with the deterministic mock backend
pub async fn mock_context() -> AppContext {
    context_with_backend(Arc::new(MockBackend::new())).await
}

/// Backend that records every prompt it receives and replies with a fixed text
pub struct RecordingBackend {
    reply: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn complete(&self, prompt: &str, _params: &GenerationParams) -> ServiceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}
