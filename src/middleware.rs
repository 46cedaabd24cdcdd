// src/middleware.rs
use std::sync::Arc;

use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};

use crate::{
    auth::{TokenKind, verify_jwt},
    auth_models::TokenClaims,
    errors::AppError,
    state::AppState,
};

/// Requires a valid bearer access token.
impl FromRequestParts<Arc<AppState>> for TokenClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to extract Bearer token header: {:?}", e);
                AppError::MissingToken("Unauthorized".into())
            })?;

        verify_jwt(bearer.token(), &state.jwt_secret, TokenKind::Access).map_err(|e| {
            tracing::warn!("Rejected bearer token: {:?}", e);
            e
        })
    }
}
