mod catalog;
mod config;
mod errors;
mod llm_client;
mod recommendation;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::recommendation::service::RecommendationService;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing GEMINI_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recommender v{}", env!("CARGO_PKG_VERSION"));

    // Load the catalog once; a missing or malformed file stops startup
    let catalog = Catalog::load(&config.catalog_path)
        .with_context(|| format!("failed to load catalog from '{}'", config.catalog_path))?;

    // Initialize LLM client
    let llm = GeminiClient::from_config(&config).context("failed to build Gemini client")?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s, max retries: {})",
        llm.model(),
        config.llm_timeout.as_secs(),
        config.llm_max_retries
    );
    info!("Response schema: {:?}", config.response_schema);

    let recommender = RecommendationService::new(
        Arc::new(catalog),
        Arc::new(llm),
        config.response_schema,
        config.llm_timeout,
    );

    let state = AppState {
        recommender: Arc::new(recommender),
        model_name: config.gemini_model.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
