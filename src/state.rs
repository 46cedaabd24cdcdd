// src/state.rs
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::CatalogProvider;
use crate::config::AppConfig;
use crate::models::Category;
use crate::user_store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub categories: Arc<[Category]>,
    pub users: UserStore,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub refresh_expiration_hours: i64,
    pub environment: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        catalog: Arc<dyn CatalogProvider>,
        categories: Vec<Category>,
        users: UserStore,
    ) -> Self {
        AppState {
            catalog,
            categories: categories.into(),
            users,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiration_hours: config.jwt_expiration_hours,
            refresh_expiration_hours: config.refresh_expiration_hours,
            environment: config.environment.clone(),
            started_at: Instant::now(),
        }
    }
}
