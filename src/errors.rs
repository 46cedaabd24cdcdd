// src/errors.rs
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation errors")]
    ValidationError(#[from] ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing token: {0}")]
    MissingToken(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Password hashing failed")]
    PasswordHashingError,

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingToken(_)
            | AppError::InvalidToken(_)
            | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::PasswordHashingError
            | AppError::CatalogUnavailable(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::NotFound(message)
            | AppError::BadRequest(message)
            | AppError::Conflict(message)
            | AppError::MissingToken(message)
            | AppError::InvalidToken(message) => message,
            AppError::ValidationError(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let msg = error.message.as_ref().map_or_else(
                            || format!("Field '{}' is invalid", field),
                            |m| m.to_string(),
                        );
                        messages.push(msg);
                    }
                }
                messages.sort();
                messages.join("; ")
            }
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::TokenExpired => "Token expired".to_string(),
            AppError::PasswordHashingError => {
                tracing::error!("Password hashing failed");
                "Internal server error".to_string()
            }
            AppError::CatalogUnavailable(reason) => {
                tracing::error!("Catalog unavailable: {}", reason);
                "Internal server error".to_string()
            }
            AppError::InternalServerError(reason) => {
                tracing::error!("Internal server error: {}", reason);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken("Invalid token".to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected JSON body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!("Rejected query string: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_keeps_its_message() {
        let (status, body) = body_json(AppError::NotFound("Product not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Product not found");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn internal_faults_hide_their_cause() {
        let (status, body) =
            body_json(AppError::CatalogUnavailable("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn expired_jwt_maps_to_token_expired() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        assert!(matches!(AppError::from(err), AppError::TokenExpired));
    }
}
