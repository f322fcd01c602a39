#![allow(missing_docs)]

//! Retort service binary.
//!
//! Loads configuration, wires the backend collaborators, and serves the
//! single generation endpoint until interrupted.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use retort::config::RetortConfig;
use retort::dispatch::Dispatcher;
use retort::limiter::RateLimiter;
use retort::logging;
use retort::providers::openai::OpenAiBackend;
use retort::providers::serper::SerperBackend;
use retort::providers::{GenerationBackend, SearchBackend};
use retort::server::{build_router, AppState};

/// Tone-styled reply generation service.
#[derive(Debug, Parser)]
#[command(name = "retort", version)]
struct Cli {
    /// Path to the config file (overrides $RETORT_CONFIG_PATH).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first, so credentials are visible to the config loader.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = RetortConfig::load(cli.config).context("failed to load configuration")?;

    let _logging_guard = logging::init_production(
        Path::new(&config.server.logs_dir),
        &config.server.log_level,
    )
    .context("failed to initialise logging")?;

    info!("retort starting");

    let generation: Option<Arc<dyn GenerationBackend>> = match &config.llm.api_key {
        Some(key) => {
            info!(model = %config.llm.model, "generation backend registered");
            Some(Arc::new(OpenAiBackend::new(
                &config.llm.base_url,
                key,
                &config.llm.model,
            )))
        }
        None => {
            warn!("no generation credential configured -- requests will fail until OPENAI_API_KEY is set");
            None
        }
    };

    let search: Option<Arc<dyn SearchBackend>> = match &config.search.api_key {
        Some(key) => {
            info!("search backend registered");
            Some(Arc::new(SerperBackend::new(key)))
        }
        None => {
            info!("no search credential configured -- advice sources use the suggestion fallback");
            None
        }
    };

    let limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(config.limits.window_seconds),
        config.limits.max_requests,
    ));
    let dispatcher = Arc::new(Dispatcher::new(generation, search));

    let app = build_router(AppState {
        limiter,
        dispatcher,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "retort ready -- listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("retort shut down cleanly");
    Ok(())
}

/// Resolve on SIGINT.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received shutdown signal, draining connections");
    }
}
