// src/lib.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod auth_models;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod query;
pub mod response;
pub mod state;
pub mod user_store;

use crate::handlers::*;
use crate::state::AppState;

/// Builds the storefront API router around the given state.
pub fn build_app(app_state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/search", get(search_products))
        .route("/api/products/{id}", get(get_product_details))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/{id}", get(get_category))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/profile", get(profile_handler))
        .route("/api/health", get(health_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(app_state))
}
