//! API route handlers
//!
//! - `GET /health`: liveness report, never fails
//! - `POST /embed`, `/search`, `/retrieve`, `/ingest`: retrieval path
//! - `POST /generate`, `/summarize`, `/feedback`: generation path

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use crate::application::AppContext;
use crate::domain::models::{
    EmbeddingVector, FeedbackRequest, FeedbackResponse, GenerationRequest, GenerationResponse, HealthReport,
    SimilarityResult, SummaryResponse,
};

/// Default `limit` for vector search requests.
const DEFAULT_SEARCH_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct EmbedBody {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmbedReply {
    pub embeddings: Vec<EmbeddingVector>,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query_vector: Vec<f32>,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct RetrieveBody {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IngestBody {
    pub texts: Vec<String>,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub ref_id: Option<i64>,
}

fn default_source() -> String {
    "api".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestReply {
    pub inserted: usize,
    pub ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    #[serde(flatten)]
    pub request: GenerationRequest,
    /// When set, retrieve this many passages and ground the prompt in them
    #[serde(default)]
    pub rag_top_k: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    pub document: String,
}

/// Unwrap a JSON body, turning extractor rejections into the uniform error body.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(value)| value).map_err(ApiError::from)
}

pub async fn health(State(ctx): State<AppContext>) -> Json<HealthReport> {
    Json(ctx.health.check().await)
}

pub async fn embed(
    State(ctx): State<AppContext>,
    payload: Result<Json<EmbedBody>, JsonRejection>,
) -> ApiResult<Json<EmbedReply>> {
    let request = body(payload)?;
    let embeddings = ctx.retrieval.embed(&request.texts).await?;
    Ok(Json(EmbedReply { embeddings }))
}

pub async fn search(
    State(ctx): State<AppContext>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResult<Json<Vec<SimilarityResult>>> {
    let request = body(payload)?;
    let results = ctx.retrieval.search_vector(&request.query_vector, request.limit).await?;
    Ok(Json(results))
}

pub async fn retrieve(
    State(ctx): State<AppContext>,
    payload: Result<Json<RetrieveBody>, JsonRejection>,
) -> ApiResult<Json<Vec<SimilarityResult>>> {
    let request = body(payload)?;
    let top_k = request.top_k.unwrap_or(ctx.config.retrieval.default_top_k);
    let results = ctx.retrieval.retrieve(&request.query, top_k).await?;
    Ok(Json(results))
}

pub async fn ingest(
    State(ctx): State<AppContext>,
    payload: Result<Json<IngestBody>, JsonRejection>,
) -> ApiResult<Json<IngestReply>> {
    let request = body(payload)?;
    let ids = ctx.retrieval.ingest(&request.texts, &request.source, request.ref_id).await?;
    Ok(Json(IngestReply { inserted: ids.len(), ids }))
}

pub async fn generate(
    State(ctx): State<AppContext>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> ApiResult<Json<GenerationResponse>> {
    let GenerateBody { request, rag_top_k } = body(payload)?;

    let response = match rag_top_k {
        Some(top_k) => {
            ctx.gateway
                .generate_with_context(&request, &ctx.retrieval, top_k)
                .await?
        }
        None => ctx.gateway.generate(&request).await?,
    };
    Ok(Json(response))
}

pub async fn summarize(
    State(ctx): State<AppContext>,
    payload: Result<Json<SummarizeBody>, JsonRejection>,
) -> ApiResult<Json<SummaryResponse>> {
    let request = body(payload)?;
    Ok(Json(ctx.gateway.summarize(&request.document).await?))
}

pub async fn feedback(
    State(ctx): State<AppContext>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<FeedbackResponse>> {
    let request = body(payload)?;
    Ok(Json(ctx.gateway.feedback(&request).await?))
}

/// 404 handler
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
