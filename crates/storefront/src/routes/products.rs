//! Catalog route handlers backed by Bling.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use masterferri_core::Paginated;

use crate::bling::types::Envelope;
use crate::bling::{Category, CategoryFilter, ProductDetail, ProductFilter, ProductSummary};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// List in-stock products.
///
/// Price bounds are applied to the fetched page only, so a page may hold
/// fewer than `limit` items while `pagination.hasMore` is still true.
pub async fn index(
    State(state): State<AppState>,
    filter: std::result::Result<Query<ProductFilter>, QueryRejection>,
) -> Result<Json<Paginated<ProductSummary>>> {
    let Query(filter) = filter.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = state.catalog().get_products(&filter.normalize()).await?;
    Ok(Json(page))
}

/// Product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<ProductDetail>>> {
    let product = state.catalog().get_product(&id).await?;
    Ok(Json(Envelope { data: product }))
}

/// List product categories.
pub async fn categories(
    State(state): State<AppState>,
    filter: std::result::Result<Query<CategoryFilter>, QueryRejection>,
) -> Result<Json<Paginated<Category>>> {
    let Query(filter) = filter.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = state.catalog().get_categories(filter).await?;
    Ok(Json(page))
}
