//! Output formatting utilities for the CLI.

use comfy_table::{presets, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::domain::models::{
    FeedbackResponse, GenerationResponse, HealthReport, SimilarityResult, SummaryResponse,
};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

impl CommandOutput for HealthReport {
    fn to_human(&self) -> String {
        let mut table = base_table();
        table.set_header(vec!["Check", "Value"]);
        table.add_row(vec![Cell::new("status"), Cell::new(&self.status)]);
        table.add_row(vec![Cell::new("model_loaded"), Cell::new(self.model_loaded)]);
        table.add_row(vec![Cell::new("db_connected"), Cell::new(self.db_connected)]);
        table.add_row(vec![Cell::new("encoder"), Cell::new(&self.encoder)]);
        table.add_row(vec![Cell::new("device"), Cell::new(&self.device)]);
        table.add_row(vec![Cell::new("backend"), Cell::new(&self.backend)]);
        table.add_row(vec![Cell::new("model_id"), Cell::new(&self.model_id)]);
        table.to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub results: Vec<SimilarityResult>,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if self.results.is_empty() {
            return format!("No matches for \"{}\".", self.query);
        }

        let mut table = base_table();
        table.set_header(vec!["#", "Distance", "Ref", "Content"]);
        for (i, hit) in self.results.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(format!("{:.4}", hit.distance)),
                Cell::new(hit.ref_id.map_or_else(|| "-".to_string(), |id| id.to_string())),
                Cell::new(truncate(&hit.content, 80)),
            ]);
        }
        format!("{table}\n\n{} match(es)", self.results.len())
    }
}

#[derive(Debug, Serialize)]
pub struct IngestOutput {
    pub inserted: usize,
    pub ids: Vec<i64>,
    pub source: String,
}

impl CommandOutput for IngestOutput {
    fn to_human(&self) -> String {
        format!("Ingested {} text(s) from source '{}'", self.inserted, self.source)
    }
}

impl CommandOutput for GenerationResponse {
    fn to_human(&self) -> String {
        match &self.parsed_json {
            Some(object) => serde_json::to_string_pretty(object).unwrap_or_else(|_| self.generated_text.clone()),
            None => format!("(no JSON object recovered)\n{}", self.generated_text),
        }
    }
}

impl CommandOutput for SummaryResponse {
    fn to_human(&self) -> String {
        self.summary.clone()
    }
}

impl CommandOutput for FeedbackResponse {
    fn to_human(&self) -> String {
        self.feedback.clone()
    }
}
