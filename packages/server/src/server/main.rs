// Main entry point for the itinerary API server

use std::sync::Arc;

use anyhow::{Context, Result};
use notion_client::NotionClient;
use server_core::domains::itinerary::NotionItineraryStore;
use server_core::kernel::{
    BasePlaceLookup, GeminiAnalyzer, GooglePlacesClient, ServerDeps, SimpleScraper,
};
use server_core::server::build_app;
use server_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting itinerary API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let notion = NotionClient::new(config.notion_api_key.clone());
    let store = Arc::new(NotionItineraryStore::new(
        notion,
        config.notion_database_id.clone(),
    ));

    let scraper = Arc::new(SimpleScraper::new().context("Failed to build scraper client")?);
    let analyzer = Arc::new(GeminiAnalyzer::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
    ));
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; analysis falls back to stub records");
    }

    let places: Option<Arc<dyn BasePlaceLookup>> = config
        .google_maps_api_key
        .clone()
        .map(|key| Arc::new(GooglePlacesClient::new(key)) as Arc<dyn BasePlaceLookup>);
    if places.is_none() {
        tracing::info!("GOOGLE_MAPS_API_KEY not set; place verification disabled");
    }

    let deps = Arc::new(ServerDeps::new(store, scraper, analyzer, places));
    let app = build_app(deps);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
