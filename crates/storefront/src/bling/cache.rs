//! Cache types for Bling API responses.

use masterferri_core::{CategoryId, Paginated, ProductId};

use super::filters::ProductQuery;
use super::types::{Category, ProductDetail, ProductSummary};

/// Cache key for catalog responses.
///
/// Product pages are keyed by the upstream request only; price filtering is
/// applied after the cache, so queries differing only in price share an
/// entry.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    ProductPage {
        page: u32,
        limit: u32,
        search: Option<String>,
        category: Option<CategoryId>,
    },
    Categories {
        page: u32,
        limit: u32,
    },
}

impl CacheKey {
    pub fn product_page(query: &ProductQuery) -> Self {
        Self::ProductPage {
            page: query.page,
            limit: query.limit,
            search: query.search.clone(),
            category: query.category,
        }
    }
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductDetail>),
    ProductPage(Vec<ProductSummary>),
    Categories(Paginated<Category>),
}
