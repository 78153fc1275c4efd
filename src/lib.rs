pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use client::{VillaClient, VillaNumberService, VillaService};
pub use error::ApiError;

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Repository, VillaStore};

use axum::serve;
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppConfig, StoreBackend};

/// Builds the configured store, optionally seeds it and serves the API until
/// the listener fails.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    match config.store.backend {
        StoreBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let database_url = config.database_url()?;
            let store = PostgresStore::new(&database_url, config.max_connections()).await?;

            info!("Running database migrations...");
            store.migrate().await?;

            serve_store(Arc::new(store), &config).await
        }
        StoreBackend::Memory => {
            info!("Using the in-memory store; data is lost on shutdown");
            serve_store(Arc::new(MemoryStore::new()), &config).await
        }
    }
}

async fn serve_store<S: VillaStore + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    if config.seed {
        info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    let app = routes::create_router::<S>().with_state(store);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Villa API running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
