// src/pagination.rs
use serde::Serialize;

use crate::models::Product;
use crate::query::PagedResult;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
pub struct PaginatedProductsResponse {
    pub products: Vec<Product>,
    pub pagination: PaginationMeta,
}

impl From<PagedResult> for PaginatedProductsResponse {
    fn from(result: PagedResult) -> Self {
        PaginatedProductsResponse {
            products: result.items,
            pagination: PaginationMeta {
                page: result.page,
                limit: result.limit,
                total: result.total,
                total_pages: result.total_pages,
            },
        }
    }
}
