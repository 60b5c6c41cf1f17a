//! Masterferri storefront library.
//!
//! Catalog API for the Masterferri auto parts store. Products and
//! categories come from the Bling ERP; checkout hands the cart off to
//! WhatsApp. Exposed as a library so the CLI and integration tests can
//! drive the same services the server uses.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bling;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
