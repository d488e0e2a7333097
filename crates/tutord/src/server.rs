//! HTTP server wiring.

use crate::config::TutordConfig;
use crate::extract::DocumentExtractor;
use crate::orchestrator::FallbackOrchestrator;
use crate::profile::ProfileStore;
use crate::routes;
use crate::search::SearchClient;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler.
pub struct AppState {
    pub config: TutordConfig,
    pub orchestrator: FallbackOrchestrator,
    pub search: Arc<dyn SearchClient>,
    pub profiles: Arc<dyn ProfileStore>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub start_time: Instant,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::answer_routes())
        .merge(routes::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = state.config.server.listen_addr.clone();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("[*]  tutord listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("server error")?;
    Ok(())
}
