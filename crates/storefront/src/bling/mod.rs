//! Bling ERP API v3 integration.
//!
//! # Architecture
//!
//! - [`BlingClient`] attaches the stored bearer token to every call and
//!   recovers from `401 Unauthorized` with a single refresh shared by all
//!   concurrent callers ([`RefreshGate`])
//! - Tokens are persisted through the [`TokenStore`] seam (`PostgreSQL` in
//!   production, memory in tests)
//! - [`ProductService`] turns storefront filters into Bling query
//!   parameters, retries transient failures on a fixed schedule and filters
//!   prices locally, since Bling cannot filter by price
//! - Responses are cached with `moka`; errors never are

pub mod auth;
mod cache;
pub mod client;
pub mod filters;
pub mod products;
pub mod refresh;
pub mod retry;
pub mod token;
pub mod types;

pub use client::BlingClient;
pub use filters::{CategoryFilter, ProductFilter, ProductQuery};
pub use products::ProductService;
pub use refresh::RefreshGate;
pub use retry::RetryPolicy;
pub use token::{MemoryTokenStore, TokenRecord, TokenStore, TokenStoreError};
pub use types::{Category, ProductDetail, ProductSummary};

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when interacting with the Bling API.
#[derive(Debug, Error)]
pub enum BlingError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bling answered with an unexpected status.
    #[error("Bling returned HTTP {status}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, truncated.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Caller input was rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The token refresh cycle failed or the retried request was rejected
    /// again.
    #[error("Authentication token expired: {0}")]
    AuthExpired(String),

    /// No refresh token available.
    #[error("Refresh token not found")]
    MissingRefreshToken,

    /// The token endpoint answered without an access token.
    #[error("missing access token")]
    MissingAccessToken,

    /// The token store could not be read.
    #[error("Token store error: {0}")]
    TokenStore(#[from] TokenStoreError),

    /// A refreshed token could not be persisted.
    #[error("Failed to persist refreshed token: {0}")]
    TokenPersistence(#[source] TokenStoreError),

    /// Upstream failure after retries were exhausted.
    #[error("Failed to fetch data from Bling API")]
    FetchFailed(#[source] Box<BlingError>),
}

impl BlingError {
    /// True for failures worth retrying: network errors, HTTP 5xx and 429.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Wrap upstream transport failures in the generic fetch error.
    ///
    /// Caller-facing kinds (not found, invalid input, auth) pass through.
    #[must_use]
    pub fn into_fetch_failure(self) -> Self {
        match self {
            Self::Http(_) | Self::Status { .. } | Self::Parse(_) => {
                Self::FetchFailed(Box::new(self))
            }
            other => other,
        }
    }
}

/// Truncate a response body for logs and error values.
fn truncate_body(body: &str) -> String {
    body.chars().take(500).collect()
}
