//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error response is JSON: `{ "error": "<message>" }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use masterferri_core::CartError;
use thiserror::Error;

use crate::bling::BlingError;

/// Message returned for any upstream failure that is not the caller's fault.
const UPSTREAM_FAILURE: &str = "Failed to fetch data from Bling API";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bling API operation failed.
    #[error("Bling error: {0}")]
    Bling(#[from] BlingError),

    /// Checkout cart was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Service is not ready to take traffic.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Bling(BlingError::InvalidInput(_)) | Self::Cart(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Bling(BlingError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Bling(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Bling(BlingError::InvalidInput(msg)) => msg.clone(),
            Self::Bling(BlingError::NotFound(_)) => "Product not found".to_string(),
            Self::Bling(_) => UPSTREAM_FAILURE.to_string(),
            Self::Cart(err) => err.to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Unavailable(_) => "Service unavailable".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Built WhatsApp order", Some(&[("items", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
