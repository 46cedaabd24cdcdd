// src/handlers.rs
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::Uri,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use crate::auth::{TokenKind, create_jwt, hash_password, verify_jwt, verify_password};
use crate::auth_models::{
    AuthResponse, LoginPayload, RefreshPayload, RegistrationPayload, TokenClaims, TokenResponse,
};
use crate::errors::AppError;
use crate::filters::{ListingParams, SearchParams};
use crate::models::{Category, Product, User, UserPublic};
use crate::pagination::PaginatedProductsResponse;
use crate::query;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::user_store::NewUser;

// --- PRODUCTS ---

pub async fn list_products(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<ListingParams>, AppError>,
) -> Result<ApiResponse<PaginatedProductsResponse>, AppError> {
    tracing::info!("Handling GET /api/products with params: {:?}", params);

    let query_params = params.into_query()?;
    let catalog = app_state.catalog.list().await?;
    let result = query::query(&catalog, &query_params);

    tracing::debug!(
        "Listing matched {} of {} products (page {}/{})",
        result.total,
        catalog.len(),
        result.page,
        result.total_pages
    );

    Ok(ApiResponse::ok(
        PaginatedProductsResponse::from(result),
        "Products retrieved successfully",
    ))
}

pub async fn search_products(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Query(params), _): WithRejection<Query<SearchParams>, AppError>,
) -> Result<ApiResponse<Vec<Product>>, AppError> {
    let term = params.term()?;
    tracing::info!("Handling GET /api/products/search for '{}'", term);

    let query_params = query::QueryParameters {
        search_term: Some(term.to_string()),
        sort_by: query::SortBy::CatalogOrder,
        ..Default::default()
    };
    let catalog = app_state.catalog.list().await?;
    let matches: Vec<Product> = catalog
        .iter()
        .filter(|p| query_params.matches(p))
        .cloned()
        .collect();

    Ok(ApiResponse::ok(matches, "Search completed successfully"))
}

pub async fn get_product_details(
    State(app_state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<ApiResponse<Product>, AppError> {
    tracing::info!("Handling GET /api/products/{}", product_id);

    match app_state.catalog.find(&product_id).await? {
        Some(product) => Ok(ApiResponse::ok(product, "Product retrieved successfully")),
        None => {
            tracing::warn!("Product not found: {}", product_id);
            Err(AppError::NotFound("Product not found".to_string()))
        }
    }
}

// --- CATEGORIES ---

pub async fn list_categories(
    State(app_state): State<Arc<AppState>>,
) -> ApiResponse<Vec<Category>> {
    tracing::info!("Handling GET /api/categories");
    ApiResponse::ok(
        app_state.categories.to_vec(),
        "Categories retrieved successfully",
    )
}

pub async fn get_category(
    State(app_state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Result<ApiResponse<Category>, AppError> {
    tracing::info!("Handling GET /api/categories/{}", category_id);

    let category = category_id
        .parse::<u32>()
        .ok()
        .and_then(|id| app_state.categories.iter().find(|c| c.id == id));

    match category {
        Some(category) => Ok(ApiResponse::ok(
            category.clone(),
            "Category retrieved successfully",
        )),
        None => {
            tracing::warn!("Category not found: {}", category_id);
            Err(AppError::NotFound("Category not found".to_string()))
        }
    }
}

// --- AUTH ---

fn issue_tokens(app_state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let token = create_jwt(
        user.id,
        user.role,
        TokenKind::Access,
        &app_state.jwt_secret,
        app_state.jwt_expiration_hours,
    )?;
    let refresh_token = create_jwt(
        user.id,
        user.role,
        TokenKind::Refresh,
        &app_state.jwt_secret,
        app_state.refresh_expiration_hours,
    )?;

    Ok(AuthResponse {
        user: user.into(),
        token,
        refresh_token,
    })
}

pub async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<RegistrationPayload>, AppError>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    if payload.has_missing_fields() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    if let Err(validation_errors) = payload.validate() {
        tracing::warn!("Registration payload rejected: {:?}", validation_errors);
        return Err(AppError::ValidationError(validation_errors));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = app_state
        .users
        .insert(NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
        })
        .await
        .inspect_err(|_| tracing::warn!("Registration attempt with an existing email"))?;

    tracing::info!("Registered new user {} (ID: {})", user.email, user.id);

    Ok(ApiResponse::created(
        issue_tokens(&app_state, user)?,
        "Registration successful",
    ))
}

pub async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginPayload>, AppError>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    if payload.validate().is_err() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let Some(user) = app_state.users.find_by_email(&payload.email).await else {
        tracing::warn!("Failed login: user {} not found", payload.email);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&user.password_hash, &payload.password)? {
        tracing::warn!("Failed login for {}: wrong password", payload.email);
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("User {} ({}) logged in", user.email, user.id);
    Ok(ApiResponse::ok(
        issue_tokens(&app_state, user)?,
        "Login successful",
    ))
}

/// Tokens are stateless, so logging out is acknowledged without server state.
pub async fn logout_handler() -> ApiResponse<Option<()>> {
    tracing::info!("Handling POST /api/auth/logout");
    ApiResponse::ok(None, "Logged out successfully")
}

pub async fn refresh_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<RefreshPayload>, AppError>,
) -> Result<ApiResponse<TokenResponse>, AppError> {
    let refresh_token = payload
        .refresh_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Refresh token is required".to_string()))?;

    let claims = verify_jwt(&refresh_token, &app_state.jwt_secret, TokenKind::Refresh)?;
    if app_state.users.find_by_id(claims.sub).await.is_none() {
        return Err(AppError::InvalidToken("Invalid token".to_string()));
    }

    let token = create_jwt(
        claims.sub,
        claims.role,
        TokenKind::Access,
        &app_state.jwt_secret,
        app_state.jwt_expiration_hours,
    )?;

    Ok(ApiResponse::ok(
        TokenResponse { token },
        "Token refreshed successfully",
    ))
}

pub async fn profile_handler(
    State(app_state): State<Arc<AppState>>,
    claims: TokenClaims,
) -> Result<ApiResponse<UserPublic>, AppError> {
    match app_state.users.find_by_id(claims.sub).await {
        Some(user) => Ok(ApiResponse::ok(
            user.into(),
            "Profile retrieved successfully",
        )),
        None => {
            tracing::warn!("Profile requested for unknown user {}", claims.sub);
            Err(AppError::NotFound("User not found".to_string()))
        }
    }
}

// --- HEALTH ---

#[derive(Debug, Serialize)]
pub struct ServicesHealth {
    pub catalog: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub environment: String,
    pub version: &'static str,
    pub services: ServicesHealth,
}

pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    tracing::info!("Handling GET /api/health");

    let (status, catalog) = match app_state.catalog.list().await {
        Ok(_) => ("healthy", "connected"),
        Err(e) => {
            tracing::error!("Health check could not read the catalog: {:?}", e);
            ("degraded", "unavailable")
        }
    };

    Json(HealthResponse {
        success: true,
        status,
        message: "API is running",
        timestamp: Utc::now(),
        uptime_seconds: app_state.started_at.elapsed().as_secs(),
        environment: app_state.environment.clone(),
        version: env!("CARGO_PKG_VERSION"),
        services: ServicesHealth { catalog },
    })
}

pub async fn fallback_handler(uri: Uri) -> AppError {
    tracing::warn!("No route for {}", uri);
    AppError::NotFound("Endpoint not found".to_string())
}
