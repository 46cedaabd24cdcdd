// src/user_store.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::errors::AppError;
use crate::models::{Role, User};

pub const DEMO_USER_NAME: &str = "John Doe";
pub const DEMO_USER_EMAIL: &str = "john@example.com";
pub const DEMO_USER_PASSWORD: &str = "password123";

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Registered accounts, kept for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<Vec<User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the demo account used by the storefront login screen.
    pub async fn with_demo_user() -> Result<Self, AppError> {
        let store = Self::new();
        store
            .insert(NewUser {
                name: DEMO_USER_NAME.to_string(),
                email: DEMO_USER_EMAIL.to_string(),
                password_hash: hash_password(DEMO_USER_PASSWORD)?,
            })
            .await?;
        Ok(store)
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let email = normalise_email(email);
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    /// Adds a customer account. The email uniqueness check and the insert
    /// happen under one write lock.
    pub async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let email = normalise_email(&new_user.email);
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.trim().to_string(),
            email,
            password_hash: new_user.password_hash,
            avatar: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

/// Stored and looked-up emails share this form: trimmed, Unicode lowercase.
fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}
