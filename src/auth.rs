// src/auth.rs
pub use crate::auth_models::{Role, TokenClaims, TokenKind};
use crate::errors::AppError;
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHashingError)?
        .to_string();

    Ok(password_hash)
}

pub fn verify_password(hashed_password: &str, password: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hashed_password).map_err(|_| AppError::InvalidCredentials)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_jwt(
    user_id: Uuid,
    role: Role,
    kind: TokenKind,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let expiration_time = now + Duration::hours(expiration_hours);

    let claims = TokenClaims {
        sub: user_id,
        role,
        kind,
        exp: expiration_time.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to create JWT: {}", e)))
}

/// Decodes a token and checks it is of the expected kind. `exp` is enforced
/// by the default validation.
pub fn verify_jwt(token: &str, secret: &str, expected: TokenKind) -> Result<TokenClaims, AppError> {
    let claims = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?
    .claims;

    if claims.kind != expected {
        return Err(AppError::InvalidToken("Invalid token".to_string()));
    }
    Ok(claims)
}
