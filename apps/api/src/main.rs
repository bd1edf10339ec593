mod config;
mod errors;
mod llm_client;
mod portfolio;
mod questionnaire;
mod routes;
mod share;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::questionnaire::catalog::Catalog;
use crate::questionnaire::session::SessionRegistry;
use crate::routes::build_router;
use crate::share::{MemoryShareStore, RedisShareStore, ShareStore};
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Buildfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (optional: generate endpoints answer 500 without it)
    let generator: Option<Arc<dyn TextGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY is not set; generation is disabled");
            None
        }
    };

    // Initialize share store: Redis when configured, otherwise process-local
    let (shares, memory_store): (Arc<dyn ShareStore>, Option<MemoryShareStore>) =
        match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                (Arc::new(RedisShareStore::new(client)), None)
            }
            None => {
                let store = MemoryShareStore::new();
                (Arc::new(store.clone()), Some(store))
            }
        };
    info!("Share store initialized ({} backend)", shares.backend());

    let catalog = Arc::new(Catalog::builtin()?);
    info!("Question catalog loaded ({} questions)", catalog.len());

    let state = AppState::new(generator, shares, catalog);
    spawn_sweeper(state.sessions.clone(), memory_store);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically evicts idle sessions and, for the in-memory backend, expired shares.
fn spawn_sweeper(sessions: SessionRegistry, shares: Option<MemoryShareStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let idle = sessions.sweep_idle();
            let (expired, live_shares) = match &shares {
                Some(store) => (store.sweep_expired().await, store.len().await),
                None => (0, 0),
            };
            if idle + expired > 0 {
                info!(
                    "Sweeper evicted {idle} idle sessions and {expired} expired shares \
                     ({} sessions, {live_shares} in-memory shares live)",
                    sessions.len()
                );
            }
        }
    });
}
