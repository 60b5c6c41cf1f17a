//! Checkout hand-off route.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::{CheckoutRequest, WhatsAppCheckout, WhatsAppOrder};
use crate::state::AppState;

/// Turn the shopper's cart into a WhatsApp order link.
pub async fn whatsapp(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<WhatsAppOrder>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let items = request.items.len().to_string();

    let order = WhatsAppCheckout::new(state.config().whatsapp_number.as_str()).order(request)?;

    add_breadcrumb(
        "checkout",
        "Built WhatsApp order",
        Some(&[("items", items.as_str())]),
    );
    Ok(Json(order))
}
