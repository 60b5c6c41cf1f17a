//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                   - Liveness check
//! GET  /health/ready             - Readiness check (token store readable)
//!
//! # Catalog (Bling)
//! GET  /api/bling/products       - Product page (page, limit, search, priceMin, priceMax, idCategoria)
//! GET  /api/bling/products/{id}  - Product detail
//! GET  /api/bling/categories     - Category page (page, limit)
//!
//! # Checkout
//! POST /api/checkout/whatsapp    - Build WhatsApp order link from cart
//! ```

pub mod checkout;
pub mod health;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the Bling catalog routes router.
pub fn bling_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/whatsapp", post(checkout::whatsapp))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/bling", bling_routes())
        .nest("/api/checkout", checkout_routes())
}

/// Build the application with request tracing and request IDs.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
