//! Daemon entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tutord::config::TutordConfig;
use tutord::extract::PlainTextExtractor;
use tutord::orchestrator::FallbackOrchestrator;
use tutord::profile::JsonProfileStore;
use tutord::search::DuckDuckGoSearch;
use tutord::providers;
use tutord::server::{run, AppState};

#[derive(Debug, Parser)]
#[command(name = "tutord", about = "Tutor answer daemon", version)]
struct Args {
    /// Path to config.toml (default: /etc/tutord/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen address from the config file
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = TutordConfig::load(args.config.as_deref());
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    let provider_ladder = providers::from_config(&config);
    if provider_ladder.is_empty() {
        warn!("[-]  No providers configured; every answer will be a canned fallback");
    } else {
        info!(
            "[*]  Provider ladder: {}",
            provider_ladder
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
    }

    let orchestrator = FallbackOrchestrator::new(
        provider_ladder,
        config.pipeline.min_acceptable_answer_chars,
    );

    let state = Arc::new(AppState {
        orchestrator,
        search: Arc::new(DuckDuckGoSearch::new(config.pipeline.search_timeout_secs)),
        profiles: Arc::new(JsonProfileStore::new(JsonProfileStore::default_dir())),
        extractor: Arc::new(PlainTextExtractor),
        start_time: Instant::now(),
        config,
    });

    run(state).await
}
