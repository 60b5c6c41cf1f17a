//! Core types for Masterferri.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod pagination;
pub mod price;

pub use cart::{Cart, CartError, CartItem, CustomerContact};
pub use id::*;
pub use pagination::{Paginated, Pagination};
pub use price::{PriceRange, format_brl};
