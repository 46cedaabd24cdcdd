// src/catalog.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::errors::AppError;
use crate::models::{Category, Product};

/// Read-only source of catalog snapshots.
///
/// `list` hands out one consistent view; a listing request filters, sorts and
/// paginates against that view only.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list(&self) -> Result<Arc<[Product]>, AppError>;

    async fn find(&self, id: &str) -> Result<Option<Product>, AppError> {
        let products = self.list().await?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }
}

/// Catalog held entirely in memory. Cloning shares the same snapshot.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    products: Arc<[Product]>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        InMemoryCatalog {
            products: products.into(),
        }
    }

    /// Demo storefront inventory.
    pub fn seeded() -> Self {
        Self::new(seed_products())
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn list(&self) -> Result<Arc<[Product]>, AppError> {
        Ok(Arc::clone(&self.products))
    }
}

#[allow(clippy::too_many_arguments)]
fn seed_product(
    id: &str,
    name: &str,
    description: &str,
    price: f64,
    category: &str,
    in_stock: bool,
    rating: f64,
    review_count: u32,
    age_days: i64,
) -> Product {
    let created_at = Utc::now() - Duration::days(age_days);
    let image_label = name.replace(' ', "+");
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
        images: vec![format!(
            "https://via.placeholder.com/300x200?text={}",
            image_label
        )],
        in_stock,
        rating,
        review_count,
        created_at,
        updated_at: created_at,
    }
}

pub fn seed_products() -> Vec<Product> {
    vec![
        seed_product(
            "1",
            "Wireless Headphones",
            "High-quality wireless headphones with noise cancellation",
            199.99,
            "Electronics",
            true,
            4.5,
            120,
            30,
        ),
        seed_product(
            "2",
            "Smart Watch",
            "Feature-rich smartwatch with health tracking",
            299.99,
            "Electronics",
            true,
            4.2,
            85,
            21,
        ),
        seed_product(
            "3",
            "Laptop Stand",
            "Ergonomic laptop stand for better posture",
            49.99,
            "Accessories",
            true,
            4.7,
            200,
            14,
        ),
        seed_product(
            "4",
            "Mechanical Keyboard",
            "Premium mechanical keyboard with RGB lighting",
            149.99,
            "Accessories",
            false,
            4.8,
            156,
            7,
        ),
        seed_product(
            "5",
            "Gaming Mouse",
            "High-precision gaming mouse with customizable DPI",
            79.99,
            "Accessories",
            true,
            4.6,
            89,
            1,
        ),
    ]
}

pub fn seed_categories() -> Vec<Category> {
    [
        (1, "Electronics", "Electronic devices and gadgets"),
        (2, "Accessories", "Computer and phone accessories"),
        (3, "Clothing", "Fashion and apparel"),
    ]
    .into_iter()
    .map(|(id, name, description)| Category {
        id,
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}
