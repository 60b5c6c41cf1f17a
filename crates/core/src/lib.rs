//! Masterferri Core - Shared domain types.
//!
//! This crate provides the types shared by every Masterferri component:
//! - `storefront` - Catalog API backed by the Bling ERP
//! - `cli` - Operator tooling for migrations, tokens, and catalog queries
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, pagination metadata, and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
