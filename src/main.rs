// src/main.rs
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_backend::build_app;
use storefront_backend::catalog::{InMemoryCatalog, seed_categories};
use storefront_backend::config::AppConfig;
use storefront_backend::state::AppState;
use storefront_backend::user_store::UserStore;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting storefront backend...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let users = match UserStore::with_demo_user().await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Could not seed the demo account: {:?}", e);
            std::process::exit(1);
        }
    };

    let catalog = InMemoryCatalog::seeded();
    let app_state = AppState::new(&config, Arc::new(catalog), seed_categories(), users);
    let app = build_app(app_state);

    let addr = config.socket_addr();
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Could not bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("API server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Server error: {}", e);
    }
}
