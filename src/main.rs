use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod catalog;
mod config;
mod error;
mod store;

use api::routes::{create_router, AppState};
use catalog::CatalogService;
use config::Config;
use store::{MongoStore, StoreAdapter};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = match config.listen_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Audio Catalog Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Static directory: {}", config.static_dir.display());

    // Decided once, before accepting traffic
    let store = connect_store(&config).await;
    store.seed().await;
    match store.count().await {
        Ok(n) => tracing::info!("Serving {} audio records ({:?} mode)", n, store.mode()),
        Err(e) => tracing::warn!("Could not count audio records: {}", e),
    }

    let state = Arc::new(AppState {
        catalog: CatalogService::new(store),
        config,
    });
    let app = create_router(state);

    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

async fn connect_store(config: &Config) -> StoreAdapter {
    let Some(url) = &config.mongodb_url else {
        tracing::info!("MONGODB_URL not set, using in-memory storage");
        return StoreAdapter::in_memory();
    };

    let connect = MongoStore::connect(
        url,
        &config.mongodb_database,
        &config.mongodb_collection,
        config.connect_timeout,
    );

    match tokio::time::timeout(config.connect_timeout, connect).await {
        Ok(Ok(primary)) => {
            tracing::info!(
                "Connected to MongoDB ({}.{})",
                config.mongodb_database,
                config.mongodb_collection
            );
            StoreAdapter::with_primary(Arc::new(primary))
        }
        Ok(Err(e)) => {
            tracing::warn!("MongoDB connection error: {}", e);
            tracing::warn!("Using in-memory storage for this process");
            StoreAdapter::in_memory()
        }
        Err(_) => {
            tracing::warn!(
                "MongoDB handshake timed out after {:?}",
                config.connect_timeout
            );
            tracing::warn!("Using in-memory storage for this process");
            StoreAdapter::in_memory()
        }
    }
}
