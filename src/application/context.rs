//! Application wiring, built once at startup and passed explicitly.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::backends::BackendDispatcher;
use crate::adapters::encoders::{model_from_config, EncoderAdapter};
use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator, PoolConfig, SqliteEmbeddingStore};
use crate::domain::models::Config;
use crate::domain::ports::{EmbeddingStore, TextEncoder};
use crate::services::{GenerationGateway, HealthService, RetrievalService};

/// Everything a request handler or CLI command needs.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub retrieval: Arc<RetrievalService>,
    pub gateway: Arc<GenerationGateway>,
    pub health: Arc<HealthService>,
}

impl AppContext {
    /// Open the store, run migrations, load the encoder and select the backend.
    pub async fn from_config(config: Config) -> Result<Self> {
        let pool = Self::open_store(&config).await?;

        let model = model_from_config(&config.encoder).context("Failed to initialize encoder model")?;
        let encoder = Arc::new(EncoderAdapter::with_model(model));

        let dispatcher = BackendDispatcher::from_config(&config.backend)
            .context("Failed to initialize generation backend")?;

        Ok(Self::from_parts(
            config,
            encoder,
            Arc::new(SqliteEmbeddingStore::new(pool)),
            Arc::new(dispatcher),
        ))
    }

    /// Create the pool and bring the schema up to date.
    pub async fn open_store(config: &Config) -> Result<SqlitePool> {
        let pool = create_pool(&config.database.url, Some(PoolConfig::from(&config.database)))
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.url))?;

        let applied = Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .context("Failed to run database migrations")?;
        tracing::info!(url = %config.database.url, applied, "database ready");

        Ok(pool)
    }

    /// Assemble services from already-built adapters.
    pub fn from_parts(
        config: Config,
        encoder: Arc<dyn TextEncoder>,
        store: Arc<dyn EmbeddingStore>,
        dispatcher: Arc<BackendDispatcher>,
    ) -> Self {
        let retrieval = Arc::new(RetrievalService::new(encoder, store));
        let gateway = Arc::new(GenerationGateway::new(Arc::clone(&dispatcher)));
        let health = Arc::new(HealthService::new(
            Arc::clone(&retrieval),
            dispatcher,
            config.encoder.device.clone(),
        ));

        Self {
            config: Arc::new(config),
            retrieval,
            gateway,
            health,
        }
    }
}
