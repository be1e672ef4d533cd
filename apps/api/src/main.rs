mod ai;
mod config;
mod credentials;
mod dashboard;
mod documents;
mod errors;
mod llm_client;
mod models;
mod render;
mod repository;
mod routes;
mod state;
mod storage;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::llm_client::LlmClient;
use crate::render::Renderer;
use crate::repository::ConsultantRepository;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Benchboard v{}", env!("CARGO_PKG_VERSION"));

    // Open the data directory and load (and migrate) stored consultants
    let store = FileStore::open(&config.data_dir)?;
    info!("Data directory: {}", store.dir().display());
    let repo = ConsultantRepository::new(Arc::new(store));
    let dashboard = Dashboard::open(repo)?;
    info!(
        "Loaded {} consultants, session restored: {}",
        dashboard.consultants().len(),
        dashboard.session().is_some()
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let renderer = Renderer::new()?;
    let state = AppState::new(dashboard, Arc::new(llm), renderer);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
