// src/query.rs
//! Product query pipeline: filter, stable sort, page window.
//!
//! The engine only reads the catalog slice it is given, so concurrent callers
//! can share one snapshot without locking.

use std::cmp::Ordering;

use strum_macros::EnumString;

use crate::models::Product;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_LIMIT: i64 = 12;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortBy {
    #[strum(serialize = "name")]
    Name,
    #[strum(serialize = "price")]
    Price,
    #[strum(serialize = "rating")]
    Rating,
    #[strum(serialize = "reviewCount")]
    ReviewCount,
    #[default]
    #[strum(serialize = "createdAt")]
    CreatedAt,
    /// Keeps the filtered sequence in catalog order.
    #[strum(disabled)]
    CatalogOrder,
}

impl SortBy {
    /// Unknown field names fall back to catalog order instead of failing.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(SortBy::CatalogOrder)
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortBy::Name => a.name.cmp(&b.name),
            SortBy::Price => a.price.total_cmp(&b.price),
            SortBy::Rating => a.rating.total_cmp(&b.rating),
            SortBy::ReviewCount => a.review_count.cmp(&b.review_count),
            SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
            SortBy::CatalogOrder => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

/// Typed listing request. Parsing from query strings happens in `filters`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub search_term: Option<String>,
    pub category: Option<String>,
    pub min_price: f64,
    pub max_price: f64,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            search_term: None,
            category: None,
            min_price: 0.0,
            max_price: f64::INFINITY,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl QueryParameters {
    /// Page number after coercion to at least 1.
    pub fn effective_page(&self) -> usize {
        usize::try_from(self.page.max(1)).unwrap_or(usize::MAX)
    }

    /// Page size after coercion into `1..=MAX_PAGE_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        // clamp keeps the value in 1..=100, which always fits in usize
        self.limit.clamp(1, MAX_PAGE_LIMIT) as usize
    }

    /// Whether a product passes the search, category and price predicates.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = non_blank(self.search_term.as_deref()) {
            let needle = term.to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(category) = non_blank(self.category.as_deref()) {
            if product.category.to_lowercase() != category.to_lowercase() {
                return false;
            }
        }

        self.min_price <= product.price && product.price <= self.max_price
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagedResult {
    pub items: Vec<Product>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Runs the listing pipeline against one catalog snapshot.
///
/// Filtering keeps records matching every present predicate, sorting is
/// stable so equal keys stay in catalog order, and the page window is
/// clamped to the filtered sequence. Never fails.
pub fn query(catalog: &[Product], params: &QueryParameters) -> PagedResult {
    let page = params.effective_page();
    let limit = params.effective_limit();

    let mut filtered: Vec<&Product> = catalog.iter().filter(|p| params.matches(p)).collect();

    if params.sort_by != SortBy::CatalogOrder {
        let sort_by = params.sort_by;
        match params.sort_order {
            SortOrder::Asc => filtered.sort_by(|a, b| sort_by.compare(a, b)),
            SortOrder::Desc => filtered.sort_by(|a, b| sort_by.compare(b, a)),
        }
    }

    let total = filtered.len();
    let start = (page - 1).saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);

    PagedResult {
        items: filtered[start..end].iter().map(|p| (*p).clone()).collect(),
        page,
        limit,
        total,
        total_pages: total.div_ceil(limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn product(id: &str, name: &str, price: f64, category: &str) -> Product {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let offset: i64 = id.parse().unwrap_or(0);
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            category: category.to_string(),
            images: vec![],
            in_stock: true,
            rating: 4.0,
            review_count: 10,
            created_at: base + Duration::days(offset),
            updated_at: base + Duration::days(offset),
        }
    }

    fn ids(result: &PagedResult) -> Vec<&str> {
        result.items.iter().map(|p| p.id.as_str()).collect()
    }

    fn five_products() -> Vec<Product> {
        (1..=5)
            .map(|i| product(&i.to_string(), &format!("Item {i}"), 10.0 * i as f64, "Misc"))
            .collect()
    }

    #[test]
    fn sorts_by_price_ascending() {
        let catalog = vec![
            product("1", "Headphones", 199.99, "Electronics"),
            product("2", "Watch", 299.99, "Electronics"),
            product("3", "Stand", 49.99, "Accessories"),
        ];
        let params = QueryParameters {
            sort_by: SortBy::Price,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        let result = query(&catalog, &params);
        let prices: Vec<f64> = result.items.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![49.99, 199.99, 299.99]);
    }

    #[test]
    fn sorts_by_rating_and_review_count() {
        let mut catalog = five_products();
        for (p, (rating, reviews)) in catalog
            .iter_mut()
            .zip([(4.5, 120), (4.2, 85), (4.7, 200), (4.8, 156), (4.6, 89)])
        {
            p.rating = rating;
            p.review_count = reviews;
        }

        let by_rating = QueryParameters {
            sort_by: SortBy::Rating,
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(ids(&query(&catalog, &by_rating)), vec!["4", "3", "5", "1", "2"]);

        let by_reviews = QueryParameters {
            sort_by: SortBy::ReviewCount,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        assert_eq!(ids(&query(&catalog, &by_reviews)), vec!["2", "5", "1", "4", "3"]);
    }

    #[test]
    fn second_page_of_two_returns_offsets_two_and_three() {
        let catalog = five_products();
        let params = QueryParameters {
            sort_by: SortBy::CatalogOrder,
            page: 2,
            limit: 2,
            ..Default::default()
        };

        let result = query(&catalog, &params);
        assert_eq!(ids(&result), vec!["3", "4"]);
        assert_eq!(result.total, 5);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn category_matches_regardless_of_case() {
        let catalog = vec![
            product("1", "A", 1.0, "electronics"),
            product("2", "B", 2.0, "Electronics"),
            product("3", "C", 3.0, "ELECTRONICS"),
            product("4", "D", 4.0, "Books"),
        ];
        let params = QueryParameters {
            category: Some("Electronics".into()),
            ..Default::default()
        };

        let result = query(&catalog, &params);
        assert_eq!(result.total, 3);
        assert!(result.items.iter().all(|p| p.id != "4"));
    }

    #[test]
    fn price_floor_above_catalog_yields_empty_result() {
        let catalog = five_products();
        let params = QueryParameters {
            min_price: 1000.0,
            ..Default::default()
        };

        let result = query(&catalog, &params);
        assert!(result.items.is_empty());
        assert_eq!(result.total, 0);
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        let catalog = five_products();
        let zero = QueryParameters {
            page: 0,
            ..Default::default()
        };
        let first = QueryParameters::default();

        let result = query(&catalog, &zero);
        assert_eq!(result.page, 1);
        assert_eq!(result, query(&catalog, &first));
    }

    #[test]
    fn limit_is_coerced_into_bounds() {
        let catalog = five_products();

        let tiny = query(
            &catalog,
            &QueryParameters {
                limit: -4,
                ..Default::default()
            },
        );
        assert_eq!(tiny.limit, 1);
        assert_eq!(tiny.items.len(), 1);
        assert_eq!(tiny.total_pages, 5);

        let huge = query(
            &catalog,
            &QueryParameters {
                limit: 10_000,
                ..Default::default()
            },
        );
        assert_eq!(huge.limit, MAX_PAGE_LIMIT as usize);
        assert_eq!(huge.items.len(), 5);
    }

    #[test]
    fn page_past_the_end_keeps_totals() {
        let catalog = five_products();
        let params = QueryParameters {
            page: i64::MAX,
            limit: 2,
            ..Default::default()
        };

        let result = query(&catalog, &params);
        assert!(result.items.is_empty());
        assert_eq!(result.total, 5);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn search_matches_name_or_description_case_insensitively() {
        let mut catalog = five_products();
        catalog[0].name = "Wireless HEADPHONES".into();
        catalog[3].description = "pairs well with headphones".into();
        let params = QueryParameters {
            search_term: Some("HeadPhones".into()),
            sort_by: SortBy::CatalogOrder,
            ..Default::default()
        };

        let result = query(&catalog, &params);
        assert_eq!(ids(&result), vec!["1", "4"]);
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let mut catalog = five_products();
        catalog[2].name = "ÉCLAIR Mould".into();
        let params = QueryParameters {
            search_term: Some("éclair".into()),
            ..Default::default()
        };

        assert_eq!(ids(&query(&catalog, &params)), vec!["3"]);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let catalog = five_products();
        let params = QueryParameters {
            search_term: Some("   ".into()),
            category: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(query(&catalog, &params).total, 5);
    }

    #[test]
    fn inverted_price_range_is_empty_not_an_error() {
        let catalog = five_products();
        let params = QueryParameters {
            min_price: 40.0,
            max_price: 20.0,
            ..Default::default()
        };

        assert_eq!(query(&catalog, &params).total, 0);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let catalog = five_products();
        let params = QueryParameters {
            min_price: 20.0,
            max_price: 40.0,
            sort_by: SortBy::Price,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        assert_eq!(ids(&query(&catalog, &params)), vec!["2", "3", "4"]);
    }

    #[test]
    fn default_sort_is_newest_first() {
        let catalog = five_products();
        let result = query(&catalog, &QueryParameters::default());
        assert_eq!(ids(&result), vec!["5", "4", "3", "2", "1"]);
    }

    #[test]
    fn catalog_order_leaves_filtered_sequence_untouched() {
        let mut catalog = five_products();
        catalog.swap(0, 4);
        let params = QueryParameters {
            sort_by: SortBy::CatalogOrder,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        assert_eq!(ids(&query(&catalog, &params)), vec!["5", "2", "3", "4", "1"]);
    }

    #[test]
    fn name_sort_is_case_sensitive() {
        let catalog = vec![
            product("1", "banana", 1.0, "Food"),
            product("2", "Cherry", 1.0, "Food"),
            product("3", "apple", 1.0, "Food"),
        ];
        let params = QueryParameters {
            sort_by: SortBy::Name,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        assert_eq!(ids(&query(&catalog, &params)), vec!["2", "3", "1"]);
    }

    #[test]
    fn equal_keys_keep_catalog_order_in_both_directions() {
        let catalog = vec![
            product("1", "A", 5.0, "X"),
            product("2", "B", 1.0, "X"),
            product("3", "C", 5.0, "X"),
            product("4", "D", 1.0, "X"),
        ];

        let asc = QueryParameters {
            sort_by: SortBy::Price,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        assert_eq!(ids(&query(&catalog, &asc)), vec!["2", "4", "1", "3"]);

        let desc = QueryParameters {
            sort_order: SortOrder::Desc,
            ..asc
        };
        assert_eq!(ids(&query(&catalog, &desc)), vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn query_does_not_mutate_catalog() {
        let catalog = five_products();
        let snapshot = catalog.clone();
        let params = QueryParameters {
            sort_by: SortBy::Price,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };

        let _ = query(&catalog, &params);
        assert_eq!(catalog, snapshot);
    }

    #[test]
    fn sort_keys_parse_leniently() {
        assert_eq!(SortBy::parse_lenient("price"), SortBy::Price);
        assert_eq!(SortBy::parse_lenient("reviewcount"), SortBy::ReviewCount);
        assert_eq!(SortBy::parse_lenient("CreatedAt"), SortBy::CreatedAt);
        assert_eq!(SortBy::parse_lenient("popularity"), SortBy::CatalogOrder);
        assert_eq!(SortOrder::parse_lenient("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient("sideways"), SortOrder::Desc);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const CATEGORIES: [&str; 3] = ["Electronics", "books", "TOYS"];

        fn arb_catalog() -> impl Strategy<Value = Vec<Product>> {
            prop::collection::vec((0u32..50_000, 0usize..3, 0u32..50, 0u32..6), 0..40).prop_map(
                |rows| {
                    rows.into_iter()
                        .enumerate()
                        .map(|(i, (cents, cat, reviews, stars))| {
                            let mut p = product(
                                &i.to_string(),
                                &format!("Product {}", reviews % 7),
                                f64::from(cents) / 100.0,
                                CATEGORIES[cat],
                            );
                            p.review_count = reviews;
                            p.rating = f64::from(stars);
                            p
                        })
                        .collect()
                },
            )
        }

        fn arb_sort() -> impl Strategy<Value = SortBy> {
            prop_oneof![
                Just(SortBy::Name),
                Just(SortBy::Price),
                Just(SortBy::Rating),
                Just(SortBy::ReviewCount),
                Just(SortBy::CreatedAt),
                Just(SortBy::CatalogOrder),
            ]
        }

        fn arb_field() -> impl Strategy<Value = SortBy> {
            arb_sort().prop_filter("catalog order has no sort key", |s| *s != SortBy::CatalogOrder)
        }

        /// Orders two products by the raw field value behind `sort_by`.
        fn field_ordering(sort_by: SortBy, a: &Product, b: &Product) -> Ordering {
            match sort_by {
                SortBy::Name => a.name.as_str().cmp(b.name.as_str()),
                SortBy::Price => a.price.partial_cmp(&b.price).unwrap(),
                SortBy::Rating => a.rating.partial_cmp(&b.rating).unwrap(),
                SortBy::ReviewCount => a.review_count.cmp(&b.review_count),
                SortBy::CreatedAt => a.created_at.timestamp().cmp(&b.created_at.timestamp()),
                SortBy::CatalogOrder => unreachable!("filtered out by arb_field"),
            }
        }

        fn arb_order() -> impl Strategy<Value = SortOrder> {
            prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)]
        }

        proptest! {
            #[test]
            fn identical_calls_return_identical_results(
                catalog in arb_catalog(),
                sort_by in arb_sort(),
                sort_order in arb_order(),
                page in 0i64..6,
                limit in 0i64..8,
            ) {
                let params = QueryParameters { sort_by, sort_order, page, limit, ..Default::default() };
                prop_assert_eq!(query(&catalog, &params), query(&catalog, &params));
            }

            #[test]
            fn pages_concatenate_to_the_full_sequence(
                catalog in arb_catalog(),
                sort_by in arb_sort(),
                sort_order in arb_order(),
                limit in 1i64..7,
            ) {
                let everything = query(
                    &catalog,
                    &QueryParameters { sort_by, sort_order, limit: MAX_PAGE_LIMIT, ..Default::default() },
                );
                let first = query(&catalog, &QueryParameters { sort_by, sort_order, limit, ..Default::default() });

                let mut stitched = Vec::new();
                for page in 1..=first.total_pages {
                    let params = QueryParameters {
                        sort_by,
                        sort_order,
                        limit,
                        page: page as i64,
                        ..Default::default()
                    };
                    stitched.extend(query(&catalog, &params).items);
                }

                prop_assert_eq!(stitched, everything.items);
            }

            #[test]
            fn narrowing_filters_never_grows_total(
                catalog in arb_catalog(),
                min in 0.0f64..250.0,
                extra in 0.0f64..250.0,
                cat in 0usize..3,
            ) {
                let wide = query(&catalog, &QueryParameters::default());
                let priced = query(&catalog, &QueryParameters { min_price: min, ..Default::default() });
                let narrower = query(
                    &catalog,
                    &QueryParameters { min_price: min, max_price: min + extra, ..Default::default() },
                );
                let with_category = query(
                    &catalog,
                    &QueryParameters {
                        min_price: min,
                        max_price: min + extra,
                        category: Some(CATEGORIES[cat].to_lowercase()),
                        ..Default::default()
                    },
                );

                prop_assert!(priced.total <= wide.total);
                prop_assert!(narrower.total <= priced.total);
                prop_assert!(with_category.total <= narrower.total);
            }

            #[test]
            fn adjacent_items_respect_sort_direction_and_stability(
                catalog in arb_catalog(),
                sort_by in arb_field(),
                sort_order in arb_order(),
            ) {
                let params = QueryParameters {
                    sort_by,
                    sort_order,
                    limit: MAX_PAGE_LIMIT,
                    ..Default::default()
                };
                let result = query(&catalog, &params);
                let position = |p: &Product| catalog.iter().position(|c| c.id == p.id).unwrap();

                for pair in result.items.windows(2) {
                    let ordering = field_ordering(sort_by, &pair[0], &pair[1]);
                    match sort_order {
                        SortOrder::Asc => { prop_assert_ne!(ordering, Ordering::Greater); }
                        SortOrder::Desc => { prop_assert_ne!(ordering, Ordering::Less); }
                    }
                    if ordering == Ordering::Equal {
                        prop_assert!(position(&pair[0]) < position(&pair[1]));
                    }
                }
            }
        }
    }
}
