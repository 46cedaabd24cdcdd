// src/filters.rs
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::AppError;
use crate::query::{
    DEFAULT_PAGE, DEFAULT_PAGE_LIMIT, QueryParameters, SortBy, SortOrder,
};

/// Raw listing query string. Every value arrives as text and is only
/// interpreted by [`ListingParams::into_query`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    // Pagination
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,

    // Filters
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    min_price: Option<String>,
    #[serde(default)]
    max_price: Option<String>,

    // Sorting
    #[serde(default)]
    sort_by: Option<String>,
    #[serde(default)]
    sort_order: Option<String>,
}

impl ListingParams {
    pub fn search_term(&self) -> Option<&str> {
        present(&self.q).or_else(|| present(&self.search))
    }

    pub fn category(&self) -> Option<&str> {
        present(&self.category)
    }

    pub fn min_price(&self) -> Result<Option<f64>, AppError> {
        parse_price("minPrice", &self.min_price)
    }

    pub fn max_price(&self) -> Result<Option<f64>, AppError> {
        parse_price("maxPrice", &self.max_price)
    }

    pub fn page(&self) -> Result<i64, AppError> {
        Ok(parse_number("page", &self.page)?.unwrap_or(DEFAULT_PAGE))
    }

    pub fn limit(&self) -> Result<i64, AppError> {
        Ok(parse_number("limit", &self.limit)?.unwrap_or(DEFAULT_PAGE_LIMIT))
    }

    pub fn sort_by(&self) -> SortBy {
        present(&self.sort_by).map_or_else(SortBy::default, SortBy::parse_lenient)
    }

    pub fn sort_order(&self) -> SortOrder {
        present(&self.sort_order).map_or_else(SortOrder::default, SortOrder::parse_lenient)
    }

    /// Validates the raw values and builds the engine input.
    pub fn into_query(self) -> Result<QueryParameters, AppError> {
        let defaults = QueryParameters::default();
        Ok(QueryParameters {
            search_term: self.search_term().map(str::to_owned),
            category: self.category().map(str::to_owned),
            min_price: self.min_price()?.unwrap_or(defaults.min_price),
            max_price: self.max_price()?.unwrap_or(defaults.max_price),
            sort_by: self.sort_by(),
            sort_order: self.sort_order(),
            page: self.page()?,
            limit: self.limit()?,
        })
    }
}

/// Query string of the unpaginated search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: Option<String>,
}

impl SearchParams {
    pub fn term(&self) -> Result<&str, AppError> {
        present(&self.q).ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(name: &str, raw: &str) -> AppError {
    AppError::BadRequest(format!("Invalid value for '{}': {}", name, raw))
}

fn parse_number<T: FromStr>(name: &str, raw: &Option<String>) -> Result<Option<T>, AppError> {
    present(raw)
        .map(|v| v.parse::<T>().map_err(|_| invalid(name, v)))
        .transpose()
}

fn parse_price(name: &str, raw: &Option<String>) -> Result<Option<f64>, AppError> {
    match parse_number::<f64>(name, raw)? {
        Some(price) if !price.is_finite() => Err(invalid(name, present(raw).unwrap_or_default())),
        other => Ok(other),
    }
}
