//! Bling token management commands.
//!
//! # Usage
//!
//! ```bash
//! # First install: exchange the code Bling appends to the redirect URL
//! mf-cli tokens authorize --code 3b4f...
//!
//! # Seed a token pair obtained by other means
//! mf-cli tokens set --access-token ... --refresh-token ...
//!
//! mf-cli tokens show
//! mf-cli tokens refresh
//! ```

use masterferri_storefront::bling::{TokenRecord, TokenStore};
use masterferri_storefront::db::PgTokenStore;
use secrecy::SecretString;

use super::{CliError, bling_client, connect, print_json};

/// Print the stored record without its secrets.
///
/// # Errors
///
/// Returns `CliError::TokenStore` if nothing is stored.
pub async fn show() -> Result<(), CliError> {
    let store = PgTokenStore::new(connect().await?);
    let record = store.load().await?;
    print_json(&summary(&record))
}

/// Store a token pair, replacing the current record.
///
/// # Errors
///
/// Returns `CliError` if the write fails.
pub async fn set(
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    scope: Option<String>,
) -> Result<(), CliError> {
    let store = PgTokenStore::new(connect().await?);
    let now_ms = chrono::Utc::now().timestamp_millis();
    let record = TokenRecord {
        access_token: SecretString::from(access_token),
        refresh_token: SecretString::from(refresh_token),
        token_type: "Bearer".to_string(),
        scope,
        expires_in,
        expires_at: TokenRecord::expiry_from(now_ms, expires_in),
    };
    store.save(&record).await?;

    tracing::info!(expires_at = record.expires_at, "Bling token stored");
    Ok(())
}

/// Exchange an authorization code and store the resulting pair.
///
/// # Errors
///
/// Returns `CliError::Bling` if Bling rejects the code.
pub async fn authorize(code: &str) -> Result<(), CliError> {
    let record = bling_client().await?.authorize(code).await?;
    tracing::info!(expires_at = record.expires_at, "Bling authorization complete");
    print_json(&summary(&record))
}

/// Refresh the access token now.
///
/// # Errors
///
/// Returns `CliError::Bling` if the refresh is rejected.
pub async fn refresh() -> Result<(), CliError> {
    let record = bling_client().await?.force_refresh().await?;
    tracing::info!(expires_at = record.expires_at, "Bling token refreshed");
    print_json(&summary(&record))
}

fn summary(record: &TokenRecord) -> serde_json::Value {
    serde_json::json!({
        "tokenType": record.token_type,
        "scope": record.scope,
        "expiresIn": record.expires_in,
        "expiresAt": chrono::DateTime::from_timestamp_millis(record.expires_at)
            .map(|t| t.to_rfc3339()),
        "expired": record.is_expired(),
    })
}
