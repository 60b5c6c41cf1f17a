//! Product and category queries against Bling.
//!
//! Bling can page through products and filter them by name, category and
//! stock, but not by price. Price bounds are applied here to each fetched
//! page, after pagination, so a filtered page may hold fewer than `limit`
//! items while `hasMore` still reflects the raw page.

use std::sync::Arc;
use std::time::Duration;

use masterferri_core::{Paginated, Pagination, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::client::BlingClient;
use super::filters::{CategoryFilter, ProductQuery};
use super::retry::RetryPolicy;
use super::types::{Category, Envelope, ProductDetail, ProductSummary};
use super::BlingError;

const PRODUCT_TTL: Duration = Duration::from_secs(300);
const CATEGORY_TTL: Duration = Duration::from_secs(900);

/// Catalog queries with retry and caching.
///
/// Product pages and details are cached for 5 minutes, categories for 15.
/// Failures are never cached.
#[derive(Clone)]
pub struct ProductService {
    inner: Arc<ProductServiceInner>,
}

struct ProductServiceInner {
    client: BlingClient,
    retry: RetryPolicy,
    products: Cache<CacheKey, CacheValue>,
    categories: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ProductService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductService")
            .field("client", &self.inner.client)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl ProductService {
    /// Create a service with the default retry schedule.
    #[must_use]
    pub fn new(client: BlingClient) -> Self {
        Self::with_retry_policy(client, RetryPolicy::default())
    }

    /// Create a service with a custom retry schedule.
    #[must_use]
    pub fn with_retry_policy(client: BlingClient, retry: RetryPolicy) -> Self {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(PRODUCT_TTL)
            .build();
        let categories = Cache::builder()
            .max_capacity(100)
            .time_to_live(CATEGORY_TTL)
            .build();

        Self {
            inner: Arc::new(ProductServiceInner {
                client,
                retry,
                products,
                categories,
            }),
        }
    }

    /// The underlying Bling client.
    #[must_use]
    pub fn client(&self) -> &BlingClient {
        &self.inner.client
    }

    /// Fetch a page of in-stock products.
    ///
    /// # Errors
    ///
    /// Returns `BlingError::FetchFailed` once retries are exhausted on
    /// upstream failures, or the authentication error if the token refresh
    /// cycle failed.
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    pub async fn get_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Paginated<ProductSummary>, BlingError> {
        let key = CacheKey::product_page(query);

        let fetched = if let Some(CacheValue::ProductPage(items)) =
            self.inner.products.get(&key).await
        {
            debug!("Cache hit for product page");
            items
        } else {
            let params = query.to_query_params();
            let (client, params) = (&self.inner.client, params.as_slice());
            let response: Envelope<Vec<ProductSummary>> = self
                .inner
                .retry
                .run("get_products", move || client.get_json("/produtos", params))
                .await
                .map_err(|e| {
                    tracing::error!(
                        endpoint = "/produtos",
                        search = query.search.as_deref().unwrap_or(""),
                        category = ?query.category,
                        error = %e,
                        "Failed to fetch products from Bling"
                    );
                    e.into_fetch_failure()
                })?;

            self.inner
                .products
                .insert(key, CacheValue::ProductPage(response.data.clone()))
                .await;
            response.data
        };

        let fetched_len = fetched.len();
        let data: Vec<ProductSummary> = if query.price.is_unbounded() {
            fetched
        } else {
            fetched
                .into_iter()
                .filter(|p| query.price.contains(p.preco))
                .collect()
        };
        let pagination = Pagination::estimate(query.page, query.limit, fetched_len, data.len());

        debug!(
            fetched = fetched_len,
            returned = data.len(),
            has_more = pagination.has_more,
            "Fetched product page"
        );

        Ok(Paginated { data, pagination })
    }

    /// Fetch one product by an untrusted id string.
    ///
    /// The id is validated before any request is made.
    ///
    /// # Errors
    ///
    /// Returns `BlingError::InvalidInput` for a malformed id,
    /// `BlingError::NotFound` if Bling has no such product, and otherwise
    /// the same errors as [`ProductService::get_products`].
    pub async fn get_product(&self, raw_id: &str) -> Result<ProductDetail, BlingError> {
        let id: ProductId = raw_id.parse().map_err(|e| {
            tracing::warn!(id = raw_id, error = %e, "Rejected product id");
            BlingError::InvalidInput(format!("invalid product id: {e}"))
        })?;
        self.get_product_by_id(id).await
    }

    /// Fetch one product by id.
    ///
    /// # Errors
    ///
    /// See [`ProductService::get_product`].
    #[instrument(skip(self))]
    pub async fn get_product_by_id(&self, id: ProductId) -> Result<ProductDetail, BlingError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.products.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("/produtos/{id}");
        let (client, path) = (&self.inner.client, path.as_str());
        let response: Envelope<ProductDetail> = self
            .inner
            .retry
            .run("get_product", move || client.get_json(path, &[]))
            .await
            .map_err(|e| {
                if matches!(e, BlingError::NotFound(_)) {
                    tracing::info!(endpoint = %path, "Product not found in Bling");
                } else {
                    tracing::error!(
                        endpoint = %path,
                        error = %e,
                        "Failed to fetch product from Bling"
                    );
                }
                e.into_fetch_failure()
            })?;

        self.inner
            .products
            .insert(key, CacheValue::Product(Box::new(response.data.clone())))
            .await;

        Ok(response.data)
    }

    /// Fetch a page of product categories.
    ///
    /// # Errors
    ///
    /// Same as [`ProductService::get_products`].
    #[instrument(skip(self))]
    pub async fn get_categories(
        &self,
        filter: CategoryFilter,
    ) -> Result<Paginated<Category>, BlingError> {
        let (page, limit) = filter.normalize();
        let key = CacheKey::Categories { page, limit };
        if let Some(CacheValue::Categories(result)) = self.inner.categories.get(&key).await {
            debug!("Cache hit for categories");
            return Ok(result);
        }

        let params = [("pagina", page.to_string()), ("limite", limit.to_string())];
        let (client, params) = (&self.inner.client, params.as_slice());
        let response: Envelope<Vec<Category>> = self
            .inner
            .retry
            .run("get_categories", move || {
                client.get_json("/categorias/produtos", params)
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    endpoint = "/categorias/produtos",
                    page,
                    limit,
                    error = %e,
                    "Failed to fetch categories from Bling"
                );
                e.into_fetch_failure()
            })?;

        let total = response.data.len();
        let result = Paginated {
            data: response.data,
            pagination: Pagination::from_count(page, limit, total),
        };

        self.inner
            .categories
            .insert(key, CacheValue::Categories(result.clone()))
            .await;

        Ok(result)
    }

    /// Drop every cached response.
    pub async fn invalidate_all(&self) {
        self.inner.products.invalidate_all();
        self.inner.categories.invalidate_all();
        self.inner.products.run_pending_tasks().await;
        self.inner.categories.run_pending_tasks().await;
    }
}
