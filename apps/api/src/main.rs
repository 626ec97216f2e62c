mod chat;
mod config;
mod errors;
mod extract;
mod llm_client;
mod models;
mod retrieval;
mod routes;
mod session;
mod state;
mod tools;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::retrieval::store::QdrantStore;
use crate::retrieval::CandidateSearch;
use crate::routes::build_router;
use crate::session::SessionHistory;
use crate::state::AppState;
use crate::tools::ToolRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (aborts on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResuMind API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the model-provider client
    let llm = LlmClient::new(config.openai_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::CHAT_MODEL);

    // Initialize the vector store client (collection is pre-populated externally)
    let store = QdrantStore::new(llm.clone(), &config)?;
    info!(
        "Vector store client initialized (collection: {})",
        config.qdrant_collection
    );

    // Register external capabilities the model may invoke
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CandidateSearch::new(Arc::new(store))));

    // Build app state
    let state = AppState {
        model: Arc::new(llm),
        tools: Arc::new(tools),
        history: Arc::new(Mutex::new(SessionHistory::new())),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
