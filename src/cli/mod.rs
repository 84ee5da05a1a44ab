//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tutorgate")]
#[command(about = "Tutorgate - retrieval and generation gateway for educational content", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this YAML file instead of tutorgate.yaml / local.yaml
    #[arg(short, long, global = true, env = "TUTORGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Report encoder and store health, and probe the generation backend
    Health,

    /// Embed texts and store them for retrieval
    Ingest {
        /// Texts to ingest
        #[arg(required_unless_present = "file")]
        texts: Vec<String>,

        /// Read texts from a file, one per non-empty line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Source label stored with each row
        #[arg(short, long, default_value = "cli")]
        source: String,

        /// External reference id stored with each row
        #[arg(short, long)]
        ref_id: Option<i64>,
    },

    /// Find stored content similar to a query
    Search {
        query: String,

        /// Number of results (defaults to retrieval.default_top_k)
        #[arg(short = 'k', long)]
        top_k: Option<i64>,
    },

    /// Generate one problem for a topic
    Generate {
        topic: String,

        /// Output schema: qa or mcq
        #[arg(short, long, default_value = "qa")]
        style: String,

        /// Ask for JSON without the strict single-line constraint
        #[arg(long)]
        relaxed: bool,

        /// Ground the prompt in this many retrieved passages
        #[arg(long)]
        rag_top_k: Option<i64>,

        #[arg(long, default_value_t = 256)]
        max_new_tokens: u32,

        #[arg(long, default_value_t = 0.2)]
        temperature: f32,
    },

    /// Summarize a document
    Summarize {
        /// Document text
        #[arg(required_unless_present = "file")]
        document: Option<String>,

        /// Read the document from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Explain why an answer is wrong
    Feedback {
        question: String,
        user_answer: String,
        correct_answer: String,
    },

    /// Print the effective configuration
    Config,
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json: bool) -> ! {
    if json {
        let body = serde_json::json!({
            "error": "command_failed",
            "detail": format!("{err:#}"),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
