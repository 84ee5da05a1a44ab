//! Command handlers. Each takes a ready [`AppContext`] and prints its result.

use anyhow::{Context, Result};
use std::path::Path;

use super::output::{output, IngestOutput, SearchOutput};
use crate::application::AppContext;
use crate::domain::models::{Config, FeedbackRequest, GenerationRequest};

pub async fn handle_health(ctx: &AppContext, json: bool) -> Result<()> {
    let report = ctx.health.check().await;
    output(&report, json);

    if let Err(e) = ctx.gateway.dispatcher().health_check().await {
        tracing::warn!(error = %e, "generation backend probe failed");
        if !json {
            println!("backend probe: {e}");
        }
    }
    Ok(())
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

pub async fn handle_ingest(
    ctx: &AppContext,
    mut texts: Vec<String>,
    file: Option<&Path>,
    source: String,
    ref_id: Option<i64>,
    json: bool,
) -> Result<()> {
    if let Some(path) = file {
        texts.extend(read_lines(path)?);
    }

    let ids = ctx
        .retrieval
        .ingest(&texts, &source, ref_id)
        .await
        .context("Failed to ingest texts")?;

    output(&IngestOutput { inserted: ids.len(), ids, source }, json);
    Ok(())
}

pub async fn handle_search(ctx: &AppContext, query: String, top_k: Option<i64>, json: bool) -> Result<()> {
    let top_k = top_k.unwrap_or(ctx.config.retrieval.default_top_k);
    let results = ctx
        .retrieval
        .retrieve(&query, top_k)
        .await
        .context("Search failed")?;

    output(&SearchOutput { query, results }, json);
    Ok(())
}

pub async fn handle_generate(ctx: &AppContext, request: GenerationRequest, rag_top_k: Option<i64>, json: bool) -> Result<()> {
    let response = match rag_top_k {
        Some(top_k) => ctx.gateway.generate_with_context(&request, &ctx.retrieval, top_k).await,
        None => ctx.gateway.generate(&request).await,
    }
    .context("Generation failed")?;

    output(&response, json);
    Ok(())
}

pub async fn handle_summarize(ctx: &AppContext, document: Option<String>, file: Option<&Path>, json: bool) -> Result<()> {
    let document = match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => document.unwrap_or_default(),
    };

    let response = ctx.gateway.summarize(&document).await.context("Summarization failed")?;
    output(&response, json);
    Ok(())
}

pub async fn handle_feedback(ctx: &AppContext, request: FeedbackRequest, json: bool) -> Result<()> {
    let response = ctx.gateway.feedback(&request).await.context("Feedback failed")?;
    output(&response, json);
    Ok(())
}

pub fn handle_config(config: &Config, json: bool) -> Result<()> {
    let mut shown = config.clone();
    if shown.backend.api_key.is_some() {
        shown.backend.api_key = Some("***".to_string());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        print!("{}", serde_yaml::to_string(&shown)?);
    }
    Ok(())
}
