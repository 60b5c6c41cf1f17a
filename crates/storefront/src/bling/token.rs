//! Bling OAuth token record and its persistence seam.
//!
//! The storefront never holds tokens only in memory: every outbound call
//! reads the current record from a [`TokenStore`], and every refresh writes
//! the new record back before anyone else is allowed to use it.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::db::RepositoryError;

/// Name of the single record the storefront reads and writes.
pub const CURRENT_TOKEN_RECORD: &str = "current";

/// Errors raised by a token store.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// No record has been stored yet.
    #[error("no Bling token record stored under '{0}'")]
    Missing(String),

    /// The backing database failed.
    #[error("token store database error: {0}")]
    Database(#[from] RepositoryError),
}

/// OAuth token pair issued by Bling.
///
/// Implements `Debug` manually to redact both tokens.
#[derive(Clone)]
pub struct TokenRecord {
    /// Bearer token attached to API calls.
    pub access_token: SecretString,
    /// Token used to obtain the next access token.
    pub refresh_token: SecretString,
    /// Token type reported by Bling (normally `Bearer`).
    pub token_type: String,
    /// Granted scopes, if reported.
    pub scope: Option<String>,
    /// Lifetime in seconds as reported at issue time. Not a live countdown.
    pub expires_in: i64,
    /// Absolute expiry in epoch milliseconds (`issued_at + expires_in * 1000`).
    pub expires_at: i64,
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl TokenRecord {
    /// Compute the absolute expiry for a token issued at `issued_at_ms`.
    #[must_use]
    pub const fn expiry_from(issued_at_ms: i64, expires_in_secs: i64) -> i64 {
        issued_at_ms.saturating_add(expires_in_secs.saturating_mul(1000))
    }

    /// Check whether the access token has expired at `now_ms`.
    #[must_use]
    pub const fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Check whether the access token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp_millis())
    }

    /// True if this record carries the given access token.
    #[must_use]
    pub fn has_access_token(&self, token: &str) -> bool {
        self.access_token.expose_secret() == token
    }
}

/// Get/set access to the persisted token record.
///
/// Implementations give no transactional guarantees beyond last-write-wins.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the current token record.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError::Missing` if nothing has been stored.
    async fn load(&self) -> Result<TokenRecord, TokenStoreError>;

    /// Replace the current token record.
    ///
    /// # Errors
    ///
    /// Returns `TokenStoreError` if the write fails.
    async fn save(&self, record: &TokenRecord) -> Result<(), TokenStoreError>;
}

/// Token store kept in process memory.
///
/// Used by tests and for local runs without a database.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: RwLock<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a record.
    #[must_use]
    pub fn with_record(record: TokenRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<TokenRecord, TokenStoreError> {
        self.record
            .read()
            .await
            .clone()
            .ok_or_else(|| TokenStoreError::Missing(CURRENT_TOKEN_RECORD.to_string()))
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), TokenStoreError> {
        *self.record.write().await = Some(record.clone());
        Ok(())
    }
}
