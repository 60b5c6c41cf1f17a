//! Cart contents and the WhatsApp order summary.
//!
//! The cart lives in the shopper's browser; the server only sees it at
//! checkout time, when it is turned into a plain-text order summary that is
//! handed off to WhatsApp. There is no payment processing.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;

/// Errors raised while building an order from a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart has no items with a positive quantity.
    #[error("cart is empty")]
    Empty,

    /// A required contact field is blank.
    #[error("{0} is required")]
    MissingContact(&'static str),
}

/// A single line in the shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Bling product ID.
    pub id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price in BRL.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Number of units.
    pub quantity: u32,
    /// Bling SKU.
    #[serde(rename = "codigo", default)]
    pub code: String,
    /// Short description.
    #[serde(rename = "descricao", default)]
    pub description: String,
}

impl CartItem {
    /// Price of this line (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Contact details the shopper provides at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerContact {
    /// Shopper's name.
    pub name: String,
    /// Shopper's phone number.
    pub phone: String,
    /// Free-form notes for the store.
    #[serde(default)]
    pub observations: Option<String>,
}

impl CustomerContact {
    /// Ensure name and phone are present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingContact` naming the first blank field.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.name.trim().is_empty() {
            return Err(CartError::MissingContact("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(CartError::MissingContact("phone"));
        }
        Ok(())
    }
}

/// A normalized cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from raw items.
    ///
    /// Lines for the same product are merged by summing quantities (first
    /// occurrence wins for name and price) and lines with zero quantity are
    /// dropped.
    #[must_use]
    pub fn from_items(raw: impl IntoIterator<Item = CartItem>) -> Self {
        let mut items: Vec<CartItem> = Vec::new();
        for item in raw {
            if item.quantity == 0 {
                continue;
            }
            if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                items.push(item);
            }
        }
        Self { items }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// True if the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Estimated order total.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Render the order summary sent to the store over WhatsApp.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Empty` for an empty cart and
    /// `CartError::MissingContact` if the contact is incomplete.
    pub fn order_message(&self, customer: &CustomerContact) -> Result<String, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }
        customer.validate()?;

        let mut message = String::from("Olá! Gostaria de fazer um pedido:\n\n");
        for item in &self.items {
            let _ = writeln!(
                message,
                "- {} - {} unidade(s) - R$ {}",
                item.name,
                item.quantity,
                money(item.line_total())
            );
        }
        let _ = write!(
            message,
            "\nTotal estimado: R$ {}\n\n",
            money(self.total_price())
        );
        let _ = writeln!(message, "Meu nome: {}", customer.name.trim());
        let _ = writeln!(message, "Telefone: {}", customer.phone.trim());

        if let Some(notes) = customer
            .observations
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            let _ = writeln!(message, "Observações: {notes}");
        }

        Ok(message)
    }
}

fn money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, price: &str, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: name.to_string(),
            price: price.parse().unwrap(),
            image: None,
            quantity,
            code: format!("SKU-{id}"),
            description: String::new(),
        }
    }

    fn contact() -> CustomerContact {
        CustomerContact {
            name: "Maria".to_string(),
            phone: "11 99999-0000".to_string(),
            observations: None,
        }
    }

    #[test]
    fn test_merges_duplicate_lines() {
        let cart = Cart::from_items([
            item(1, "Filtro de óleo", "25.90", 1),
            item(2, "Pastilha de freio", "89.00", 2),
            item(1, "Filtro de óleo", "25.90", 3),
        ]);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 4);
        assert_eq!(cart.total_items(), 6);
    }

    #[test]
    fn test_drops_zero_quantity() {
        let cart = Cart::from_items([item(1, "Vela", "10", 0)]);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_price() {
        let cart = Cart::from_items([item(1, "A", "10.50", 2), item(2, "B", "0.99", 1)]);
        assert_eq!(cart.total_price(), "21.99".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_order_message_format() {
        let cart = Cart::from_items([item(1, "Filtro", "25.9", 2)]);
        let mut customer = contact();
        customer.observations = Some("Retiro na loja".to_string());

        let message = cart.order_message(&customer).unwrap();
        assert_eq!(
            message,
            "Olá! Gostaria de fazer um pedido:\n\n\
             - Filtro - 2 unidade(s) - R$ 51.80\n\
             \nTotal estimado: R$ 51.80\n\n\
             Meu nome: Maria\n\
             Telefone: 11 99999-0000\n\
             Observações: Retiro na loja\n"
        );
    }

    #[test]
    fn test_order_message_omits_blank_observations() {
        let cart = Cart::from_items([item(1, "Filtro", "1", 1)]);
        let mut customer = contact();
        customer.observations = Some("   ".to_string());
        let message = cart.order_message(&customer).unwrap();
        assert!(!message.contains("Observações"));
    }

    #[test]
    fn test_order_message_rejects_empty_cart() {
        let cart = Cart::default();
        assert_eq!(cart.order_message(&contact()), Err(CartError::Empty));
    }

    #[test]
    fn test_order_message_requires_contact() {
        let cart = Cart::from_items([item(1, "Filtro", "1", 1)]);
        let mut customer = contact();
        customer.phone = " ".to_string();
        assert_eq!(
            cart.order_message(&customer),
            Err(CartError::MissingContact("phone"))
        );
    }

    #[test]
    fn test_cart_item_wire_format() {
        let json = serde_json::json!({
            "id": 5,
            "name": "Amortecedor",
            "price": 199.9,
            "image": "https://cdn.example/a.jpg",
            "quantity": 1,
            "codigo": "AM-5",
            "descricao": "Dianteiro"
        });
        let item: CartItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.code, "AM-5");
        assert_eq!(item.price.round_dp(2), "199.9".parse::<Decimal>().unwrap());
    }
}
