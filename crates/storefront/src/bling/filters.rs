//! Storefront filters and their translation to Bling query parameters.

use masterferri_core::{CategoryId, PriceRange};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Bling rejects pages larger than this.
pub const MAX_LIMIT: u32 = 100;

/// Default product page size.
pub const DEFAULT_PRODUCT_LIMIT: u32 = 30;

/// Default category page size.
pub const DEFAULT_CATEGORY_LIMIT: u32 = 100;

/// Raw product filter as received from the storefront.
///
/// Every field is optional and unvalidated; call [`ProductFilter::normalize`]
/// before using it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    #[serde(rename = "idCategoria")]
    pub category: Option<i64>,
}

/// A validated product query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub price: PriceRange,
    pub category: Option<CategoryId>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductFilter::default().normalize()
    }
}

impl ProductFilter {
    /// Clamp and clean the filter.
    ///
    /// - `page` is at least 1 (default 1)
    /// - `limit` is clamped to `1..=100` (default 30)
    /// - `search` is trimmed; blank means absent
    /// - negative prices are dropped
    /// - non-positive category ids are dropped
    #[must_use]
    pub fn normalize(self) -> ProductQuery {
        ProductQuery {
            page: clamp_page(self.page),
            limit: clamp_limit(self.limit, DEFAULT_PRODUCT_LIMIT),
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            price: PriceRange::new(self.price_min, self.price_max),
            category: self.category.filter(|id| *id > 0).map(CategoryId::new),
        }
    }
}

impl ProductQuery {
    /// Bling query parameters for `GET /produtos`.
    ///
    /// Only products with stock are requested. Price bounds are not sent
    /// since Bling has no price filter.
    #[must_use]
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("filtroSaldoEstoque", "1".to_string()),
            ("pagina", self.page.to_string()),
            ("limite", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            params.push(("nome", search.clone()));
        }
        if let Some(category) = self.category {
            params.push(("idCategoria", category.to_string()));
        }
        params
    }
}

/// Category listing filter.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CategoryFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl CategoryFilter {
    /// Returns `(page, limit)` with the same clamping as products, but a
    /// default page size of 100.
    #[must_use]
    pub fn normalize(self) -> (u32, u32) {
        (
            clamp_page(self.page),
            clamp_limit(self.limit, DEFAULT_CATEGORY_LIMIT),
        )
    }
}

fn clamp_page(page: Option<i64>) -> u32 {
    page.map_or(1, |p| {
        u32::try_from(p.clamp(1, i64::from(u32::MAX))).unwrap_or(1)
    })
}

fn clamp_limit(limit: Option<i64>, default: u32) -> u32 {
    limit.map_or(default, |l| {
        u32::try_from(l.clamp(1, i64::from(MAX_LIMIT))).unwrap_or(default)
    })
}
