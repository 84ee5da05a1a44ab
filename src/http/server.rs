//! Server initialization and routing

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::application::AppContext;

/// Build the router with all routes and middleware
pub fn build_router(ctx: AppContext) -> Router {
    let timeout = Duration::from_secs(ctx.config.server.request_timeout_secs);

    Router::new()
        .route("/health", get(routes::health))
        .route("/embed", post(routes::embed))
        .route("/search", post(routes::search))
        .route("/retrieve", post(routes::retrieve))
        .route("/ingest", post(routes::ingest))
        .route("/generate", post(routes::generate))
        .route("/summarize", post(routes::summarize))
        .route("/feedback", post(routes::feedback))
        .fallback(routes::not_found)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve until Ctrl+C / SIGTERM
pub async fn serve(ctx: AppContext) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port)
        .parse()
        .context("Invalid server host/port")?;

    tracing::info!(
        %addr,
        backend = %ctx.config.backend.kind,
        encoder = %ctx.config.encoder.model_name,
        "starting tutorgate server"
    );

    let app = build_router(ctx);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        () = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
