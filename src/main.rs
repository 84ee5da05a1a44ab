//! Tutorgate CLI entry point.

use anyhow::Result;
use clap::Parser;

use tutorgate::application::AppContext;
use tutorgate::cli::{commands, handle_error, Cli, Commands};
use tutorgate::domain::models::{Config, FeedbackRequest, GenerationRequest};
use tutorgate::infrastructure::config::ConfigLoader;
use tutorgate::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(&err, json);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if matches!(cli.command, Commands::Config) {
        return commands::handle_config(&config, cli.json);
    }

    let _logger = LoggerImpl::init(&config.logging)?;
    let ctx = AppContext::from_config(config).await?;

    match cli.command {
        Commands::Serve => tutorgate::http::serve(ctx).await,
        Commands::Health => commands::handle_health(&ctx, cli.json).await,
        Commands::Ingest { texts, file, source, ref_id } => {
            commands::handle_ingest(&ctx, texts, file.as_deref(), source, ref_id, cli.json).await
        }
        Commands::Search { query, top_k } => commands::handle_search(&ctx, query, top_k, cli.json).await,
        Commands::Generate { topic, style, relaxed, rag_top_k, max_new_tokens, temperature } => {
            let request = GenerationRequest {
                style,
                strict_json: !relaxed,
                max_new_tokens,
                temperature,
                ..GenerationRequest::for_topic(topic)
            };
            commands::handle_generate(&ctx, request, rag_top_k, cli.json).await
        }
        Commands::Summarize { document, file } => {
            commands::handle_summarize(&ctx, document, file.as_deref(), cli.json).await
        }
        Commands::Feedback { question, user_answer, correct_answer } => {
            let request = FeedbackRequest { question, user_answer, correct_answer };
            commands::handle_feedback(&ctx, request, cli.json).await
        }
        Commands::Config => commands::handle_config(&ctx.config, cli.json),
    }
}
