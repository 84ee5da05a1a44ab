//! SQLite implementation of the EmbeddingStore.
//!
//! Vectors are stored as little-endian `f32` BLOBs and compared in Rust, so
//! the store needs no SQLite extension.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};
use std::time::Duration;

use crate::domain::errors::{ServiceError, ServiceResult};
use crate::domain::models::{EmbeddingVector, NewEmbedding, SimilarityResult, StoredEmbedding};
use crate::domain::ports::EmbeddingStore;

#[derive(Clone)]
pub struct SqliteEmbeddingStore {
    pool: SqlitePool,
    acquire_timeout: Duration,
}

impl SqliteEmbeddingStore {
    pub fn new(pool: SqlitePool) -> Self {
        let acquire_timeout = pool.options().get_acquire_timeout();
        Self { pool, acquire_timeout }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn map_err(&self, err: sqlx::Error) -> ServiceError {
        ServiceError::from_sqlx(err, self.acquire_timeout)
    }

    /// Check out a connection; dropped (and returned to the pool) by the caller's scope.
    async fn acquire(&self) -> ServiceResult<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(|e| self.map_err(e))
    }

    /// Fetch a single stored row.
    pub async fn get(&self, id: i64) -> ServiceResult<Option<StoredEmbedding>> {
        let mut conn = self.acquire().await?;
        let row: Option<EmbeddingRow> = sqlx::query_as(
            "SELECT id, model_name, source, ref_id, content, embedding, created_at
             FROM embeddings WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| self.map_err(e))?;

        row.map(StoredEmbedding::try_from).transpose()
    }
}

#[async_trait]
impl EmbeddingStore for SqliteEmbeddingStore {
    async fn insert(&self, embedding: NewEmbedding) -> ServiceResult<i64> {
        let mut conn = self.acquire().await?;

        let result = sqlx::query(
            "INSERT INTO embeddings (model_name, source, ref_id, content, embedding)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&embedding.model_name)
        .bind(&embedding.source)
        .bind(embedding.ref_id)
        .bind(&embedding.content)
        .bind(embedding.embedding.to_bytes())
        .execute(&mut *conn)
        .await
        .map_err(|e| self.map_err(e))?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_batch(&self, embeddings: Vec<NewEmbedding>) -> ServiceResult<Vec<i64>> {
        if embeddings.is_empty() {
            return Ok(Vec::new());
        }

        // Rolled back on drop if any insert fails.
        let mut tx = self.pool.begin().await.map_err(|e| self.map_err(e))?;
        let mut ids = Vec::with_capacity(embeddings.len());

        for embedding in &embeddings {
            let result = sqlx::query(
                "INSERT INTO embeddings (model_name, source, ref_id, content, embedding)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&embedding.model_name)
            .bind(&embedding.source)
            .bind(embedding.ref_id)
            .bind(&embedding.content)
            .bind(embedding.embedding.to_bytes())
            .execute(&mut *tx)
            .await
            .map_err(|e| self.map_err(e))?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit().await.map_err(|e| self.map_err(e))?;
        Ok(ids)
    }

    async fn search(&self, query: &[f32], top_k: i64) -> ServiceResult<Vec<SimilarityResult>> {
        if top_k <= 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "top_k must be positive, got {top_k}"
            )));
        }
        let limit = usize::try_from(top_k).unwrap_or(usize::MAX);

        let rows: Vec<CandidateRow> = {
            let mut conn = self.acquire().await?;
            sqlx::query_as("SELECT content, ref_id, embedding FROM embeddings ORDER BY id ASC")
                .fetch_all(&mut *conn)
                .await
                .map_err(|e| self.map_err(e))?
        };

        let query = EmbeddingVector::new(query.to_vec());
        let mut results: Vec<SimilarityResult> = rows
            .into_iter()
            .filter_map(|row| {
                let stored = EmbeddingVector::from_bytes(&row.embedding)?;
                let distance = query.euclidean_distance(stored.as_slice())?;
                Some(SimilarityResult {
                    content: row.content,
                    ref_id: row.ref_id,
                    distance,
                })
            })
            .collect();

        // Stable: equal distances keep id order.
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(limit);

        tracing::debug!(top_k, returned = results.len(), "similarity search complete");
        Ok(results)
    }

    async fn count(&self) -> ServiceResult<i64> {
        let mut conn = self.acquire().await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM embeddings")
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(count)
    }

    async fn ping(&self) -> ServiceResult<()> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1")
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    content: String,
    ref_id: Option<i64>,
    embedding: Vec<u8>,
}

#[derive(sqlx::FromRow)]
struct EmbeddingRow {
    id: i64,
    model_name: String,
    source: String,
    ref_id: Option<i64>,
    content: String,
    embedding: Vec<u8>,
    created_at: String,
}

impl TryFrom<EmbeddingRow> for StoredEmbedding {
    type Error = ServiceError;

    fn try_from(row: EmbeddingRow) -> Result<Self, Self::Error> {
        let embedding = EmbeddingVector::from_bytes(&row.embedding).ok_or_else(|| {
            ServiceError::Database(format!("embedding {} has a malformed vector blob", row.id))
        })?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ServiceError::Database(format!("invalid created_at: {e}")))?;

        Ok(Self {
            id: row.id,
            model_name: row.model_name,
            source: row.source,
            ref_id: row.ref_id,
            content: row.content,
            embedding,
            created_at,
        })
    }
}
