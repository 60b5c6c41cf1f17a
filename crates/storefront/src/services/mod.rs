//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `whatsapp` - Checkout hand-off (cart → WhatsApp order message)

pub mod whatsapp;

pub use whatsapp::{CheckoutRequest, WhatsAppCheckout, WhatsAppOrder};
