//! WhatsApp checkout hand-off.
//!
//! The storefront takes no payments. At checkout the cart is turned into a
//! plain-text order summary and the shopper is sent to a `wa.me` link that
//! opens a chat with the store, message pre-filled.

use masterferri_core::{Cart, CartError, CartItem, CustomerContact};
use serde::{Deserialize, Serialize};

const WA_ME_BASE: &str = "https://wa.me";

/// Checkout payload posted by the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub customer: CustomerContact,
}

/// Result of a checkout hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppOrder {
    /// Link that opens the chat with the message pre-filled.
    pub url: String,
    /// The order summary, unencoded.
    pub message: String,
}

/// Builds WhatsApp order links for the store's number.
#[derive(Debug, Clone)]
pub struct WhatsAppCheckout {
    number: String,
}

impl WhatsAppCheckout {
    /// `number` must be digits only, country code included.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }

    /// Build the order link for a cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Empty` if no line has a positive quantity and
    /// `CartError::MissingContact` if name or phone is blank.
    pub fn order(&self, request: CheckoutRequest) -> Result<WhatsAppOrder, CartError> {
        let cart = Cart::from_items(request.items);
        let message = cart.order_message(&request.customer)?;

        tracing::info!(
            lines = cart.items().len(),
            units = cart.total_items(),
            "Built WhatsApp order"
        );

        Ok(WhatsAppOrder {
            url: self.link(&message),
            message,
        })
    }

    /// `wa.me` link with `text` percent-encoded.
    #[must_use]
    pub fn link(&self, text: &str) -> String {
        format!(
            "{WA_ME_BASE}/{}?text={}",
            self.number,
            urlencoding::encode(text)
        )
    }
}
