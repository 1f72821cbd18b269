mod config;
mod db;
mod embedding;
mod errors;
mod extraction;
mod linkedin;
mod llm_client;
mod models;
mod onboarding;
mod profile;
mod routes;
mod similarity;
mod state;
mod store;
mod text;
mod users;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::OpenAiEmbeddingClient;
use crate::linkedin::HttpLinkedInClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgProfileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Spark API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = PgProfileStore::new(db);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize embedding client
    let embedder = OpenAiEmbeddingClient::new(
        config.embedding_api_url.clone(),
        config.embedding_model.clone(),
        config.openai_api_key.clone(),
    )?;
    info!(
        "Embedding client initialized (model: {}, {} dimensions)",
        embedder.model(),
        config.embedding_dimensions
    );

    // Initialize LinkedIn enrichment (optional)
    if config.linkedin_api_url.is_none() {
        warn!("LINKEDIN_API_URL not set; LinkedIn lookups will degrade to a placeholder");
    }
    let linkedin = HttpLinkedInClient::new(
        config.linkedin_api_url.clone(),
        config.linkedin_api_key.clone(),
    )?;

    info!(
        "Similarity ranking: {:.2} embedding / {:.2} interests, top {}",
        config.ranking.embedding_weight, config.ranking.interest_weight, config.ranking.top_k
    );

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        llm: Arc::new(llm),
        embedder: Arc::new(embedder),
        linkedin: Arc::new(linkedin),
        ranking: config.ranking.clone(),
        embedding_dimensions: config.embedding_dimensions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the mobile API gateway is in place

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
