//! Integration tests for the product service against a mock Bling.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use masterferri_integration_tests::{TestContext, product_detail_json, product_json};
use masterferri_storefront::bling::{BlingError, CategoryFilter, ProductFilter};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn price_filter(min: i64, max: i64) -> ProductFilter {
    ProductFilter {
        price_min: Some(Decimal::from(min)),
        price_max: Some(Decimal::from(max)),
        ..Default::default()
    }
}

// ============================================================================
// Retry
// ============================================================================

#[tokio::test]
async fn test_persistent_server_error_is_attempted_four_times() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&ctx.server)
        .await;

    let err = ctx
        .catalog
        .get_products(&ProductFilter::default().normalize())
        .await
        .unwrap_err();

    assert!(matches!(err, BlingError::FetchFailed(_)), "got {err:?}");
    assert_eq!(err.to_string(), "Failed to fetch data from Bling API");
}

#[tokio::test]
async fn test_rate_limit_is_retried_until_success() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [product_json(1, 50)] })),
        )
        .mount(&ctx.server)
        .await;

    let page = ctx
        .catalog
        .get_products(&ProductFilter::default().normalize())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(ctx.hits("/produtos").await, 3);
}

// ============================================================================
// Price filtering
// ============================================================================

#[tokio::test]
async fn test_price_filter_thins_page_but_keeps_has_more() {
    let ctx = TestContext::new().await;
    // 30 products, the first 10 priced 100..=460, the rest above 1000
    let products: Vec<_> = (1..=30_u32)
        .map(|i| {
            let price = if i <= 10 { 100 + 40 * (i - 1) } else { 1000 + i };
            product_json(i64::from(i), price)
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .and(query_param("pagina", "1"))
        .and(query_param("limite", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": products })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let page = ctx
        .catalog
        .get_products(&price_filter(100, 500).normalize())
        .await
        .unwrap();

    assert_eq!(page.data.len(), 10);
    assert!(
        page.data
            .iter()
            .all(|p| p.preco >= Decimal::from(100) && p.preco <= Decimal::from(500))
    );
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.total, 10);
    assert!(page.pagination.has_more);
    assert_eq!(page.pagination.total_pages, 2);
}

#[tokio::test]
async fn test_inverted_price_range_returns_nothing() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [product_json(1, 150), product_json(2, 250)]
        })))
        .mount(&ctx.server)
        .await;

    let page = ctx
        .catalog
        .get_products(&price_filter(500, 100).normalize())
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert!(!page.pagination.has_more);
}

#[tokio::test]
async fn test_price_bounds_share_cached_page() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/produtos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [product_json(1, 50), product_json(2, 150), product_json(3, 250)]
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let cheap = ctx
        .catalog
        .get_products(&price_filter(0, 100).normalize())
        .await
        .unwrap();
    let pricey = ctx
        .catalog
        .get_products(&price_filter(200, 1000).normalize())
        .await
        .unwrap();

    assert_eq!(cheap.data.len(), 1);
    assert_eq!(pricey.data.len(), 1);
    assert_eq!(pricey.data[0].id, 3);
}

// ============================================================================
// Product detail
// ============================================================================

#[tokio::test]
async fn test_invalid_ids_never_reach_bling() {
    let ctx = TestContext::new().await;

    for raw in ["abc", "0", "-5", "12abc", ""] {
        let err = ctx.catalog.get_product(raw).await.unwrap_err();
        assert!(matches!(err, BlingError::InvalidInput(_)), "{raw}: {err:?}");
    }
    assert!(ctx.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_product_is_not_found_without_retry() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/produtos/404404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx.catalog.get_product("404404").await.unwrap_err();
    assert!(matches!(err, BlingError::NotFound(_)));
}

#[tokio::test]
async fn test_product_detail() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/produtos/77"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": product_detail_json(77) })),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let product = ctx.catalog.get_product("77").await.unwrap();
    assert_eq!(product.id, 77);
    assert_eq!(product.marca.as_deref(), Some("Bosch"));
    assert!(product.in_stock());
    assert_eq!(product.main_image(), Some("https://cdn.example.com/a.jpg"));

    // Served from cache the second time
    let again = ctx.catalog.get_product(" 77 ").await.unwrap();
    assert_eq!(again, product);
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_categories_page() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/categorias/produtos"))
        .and(query_param("pagina", "1"))
        .and(query_param("limite", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": 1, "descricao": "Freios", "categoriaPai": { "id": 0 } },
                { "id": 2, "descricao": "Pastilhas", "categoriaPai": { "id": 1 } }
            ]
        })))
        .mount(&ctx.server)
        .await;

    let page = ctx
        .catalog
        .get_categories(CategoryFilter {
            page: None,
            limit: Some(2),
        })
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[1].descricao, "Pastilhas");
    assert_eq!(page.pagination.total, 2);
    assert_eq!(page.pagination.total_pages, 1);
    assert!(page.pagination.has_more);
}
