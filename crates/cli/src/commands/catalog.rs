//! Catalog query commands.
//!
//! Run through the same `ProductService` the API uses, so the output
//! matches `/api/bling/*` responses, price filtering included.

use masterferri_core::format_brl;
use masterferri_storefront::bling::{CategoryFilter, ProductFilter, ProductService};

use super::{CliError, bling_client, print_json};

/// List products.
///
/// # Errors
///
/// Returns `CliError::Bling` once retries are exhausted.
pub async fn list_products(filter: ProductFilter) -> Result<(), CliError> {
    let catalog = ProductService::new(bling_client().await?);
    let page = catalog.get_products(&filter.normalize()).await?;

    for product in &page.data {
        tracing::info!(
            id = product.id,
            price = %format_brl(product.preco),
            "{}",
            product.nome
        );
    }
    print_json(&page)
}

/// Show one product.
///
/// # Errors
///
/// Returns `CliError::Bling` for an invalid or unknown ID.
pub async fn get_product(id: &str) -> Result<(), CliError> {
    let catalog = ProductService::new(bling_client().await?);
    let product = catalog.get_product(id).await?;
    print_json(&product)
}

/// List categories.
///
/// # Errors
///
/// Returns `CliError::Bling` once retries are exhausted.
pub async fn list_categories(filter: CategoryFilter) -> Result<(), CliError> {
    let catalog = ProductService::new(bling_client().await?);
    let page = catalog.get_categories(filter).await?;
    print_json(&page)
}
