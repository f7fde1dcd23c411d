mod auth;
mod config;
mod crawler;
mod db;
mod errors;
mod folders;
mod llm_client;
mod models;
mod routes;
mod state;
mod storage;
mod tips;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::crawler::{HttpCrawler, PageCrawler};
use crate::db::create_pool;
use crate::llm_client::AnthropicClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::memory::MemoryStore;
use crate::storage::postgres::PgStore;
use crate::storage::{FolderStore, TipStore};
use crate::tips::assembler::TipPipeline;

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

    info!("Starting TipStash API v{}", env!("CARGO_PKG_VERSION"));

    // Pick the persistence backend once; no runtime fallback between them.
    let (tips, folders): (Arc<dyn TipStore>, Arc<dyn FolderStore>) = match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(url).await?;
            let store = Arc::new(PgStore::new(pool));
            (store.clone(), store)
        }
        StorageBackend::Memory => {
            info!("Using the in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    let model = Arc::new(AnthropicClient::new(config.anthropic_api_key.clone()));
    info!("Model client initialized (model: {})", llm_client::MODEL);

    let crawler: Arc<dyn PageCrawler> = Arc::new(HttpCrawler::new(config.crawl_timeout_secs));

    let pipeline = Arc::new(TipPipeline::new(
        model,
        crawler.clone(),
        tips.clone(),
        folders.clone(),
    ));

    let state = AppState {
        tips,
        folders,
        crawler,
        pipeline,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
