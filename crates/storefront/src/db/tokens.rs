//! `PostgreSQL`-backed Bling token store.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use super::RepositoryError;
use crate::bling::token::{CURRENT_TOKEN_RECORD, TokenRecord, TokenStore, TokenStoreError};

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    access_token: String,
    refresh_token: String,
    token_type: String,
    scope: Option<String>,
    expires_in: i64,
    expires_at: i64,
}

impl TryFrom<TokenRow> for TokenRecord {
    type Error = RepositoryError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        if row.access_token.is_empty() {
            return Err(RepositoryError::DataCorruption(
                "stored Bling access token is empty".to_string(),
            ));
        }
        Ok(Self {
            access_token: SecretString::from(row.access_token),
            refresh_token: SecretString::from(row.refresh_token),
            token_type: row.token_type,
            scope: row.scope,
            expires_in: row.expires_in,
            expires_at: row.expires_at,
        })
    }
}

/// Token store persisting a single named row in `storefront.bling_tokens`.
#[derive(Debug, Clone)]
pub struct PgTokenStore {
    pool: PgPool,
    name: String,
}

impl PgTokenStore {
    /// Create a store for the `current` record.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::named(pool, CURRENT_TOKEN_RECORD)
    }

    /// Create a store for an arbitrary record name.
    #[must_use]
    pub fn named(pool: PgPool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }

    async fn fetch(&self) -> Result<Option<TokenRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r"
            SELECT access_token, refresh_token, token_type, scope,
                   expires_in, expires_at
            FROM storefront.bling_tokens
            WHERE name = $1
            ",
        )
        .bind(&self.name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TokenRecord::try_from).transpose()
    }

    async fn upsert(&self, record: &TokenRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.bling_tokens (
                name, access_token, refresh_token, token_type, scope,
                expires_in, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                token_type = EXCLUDED.token_type,
                scope = EXCLUDED.scope,
                expires_in = EXCLUDED.expires_in,
                expires_at = EXCLUDED.expires_at,
                updated_at = NOW()
            ",
        )
        .bind(&self.name)
        .bind(record.access_token.expose_secret())
        .bind(record.refresh_token.expose_secret())
        .bind(&record.token_type)
        .bind(record.scope.as_deref())
        .bind(record.expires_in)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn load(&self) -> Result<TokenRecord, TokenStoreError> {
        self.fetch()
            .await?
            .ok_or_else(|| TokenStoreError::Missing(self.name.clone()))
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), TokenStoreError> {
        self.upsert(record).await?;
        tracing::debug!(name = %self.name, "Persisted Bling token record");
        Ok(())
    }
}
