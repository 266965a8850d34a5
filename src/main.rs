// Search Service Main Entry Point
// Wires the shared clients together at startup and serves the HTTP surface:
// index page, text/image semantic search, bulk index deletion, embeddings.
use std::sync::Arc;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use search_service::api::{self, AppState};
use search_service::embeddings::HttpEmbeddingProvider;
use search_service::search::OpenSearchClient;
use search_service::storage::UrlSigner;
use search_service::views::Views;
use search_service::Config;
use tracing::info;
use tracing_actix_web::TracingLogger;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("Starting search service");

    // Load configuration
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let timeout = std::time::Duration::from_secs(config.request_timeout_secs);

    // Shared clients, created once and reused by every request
    let embedder: Arc<HttpEmbeddingProvider> = Arc::new(HttpEmbeddingProvider::new(
        config.embeddings_url.clone(),
        config.max_embedding_input_chars,
        timeout,
    )?);
    let search = Arc::new(OpenSearchClient::new(&config, embedder.clone())?);
    let signer = Arc::new(UrlSigner::from_config(&config)?);
    let views = Arc::new(Views::new("templates/**/*.html")?);

    info!(
        search = %config.search_base_url(),
        embeddings = %config.embeddings_url,
        region = %config.region,
        "Initialized search, embedding, and signing clients"
    );

    let state = web::Data::new(AppState {
        search,
        embedder,
        signer,
        views,
    });

    let bind = (config.host.clone(), config.port);
    info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(api::configure)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
