//! CLI subcommands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `BLING_CLIENT_ID`, `BLING_CLIENT_SECRET` - Bling OAuth app credentials
//! - `BLING_API_URL` - Bling API base URL (optional)

pub mod catalog;
pub mod migrate;
pub mod tokens;

use std::sync::Arc;

use masterferri_storefront::bling::{BlingClient, BlingError, TokenStoreError};
use masterferri_storefront::config::{BlingConfig, ConfigError, get_database_url};
use masterferri_storefront::db::PgTokenStore;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by the CLI subcommands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Token store error.
    #[error("Token store error: {0}")]
    TokenStore(#[from] TokenStoreError),

    /// Bling API error.
    #[error("Bling error: {0}")]
    Bling(#[from] BlingError),

    /// Output could not be serialized.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Connect to the storefront database.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;

    tracing::info!("Connecting to storefront database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Build a Bling client over the database token store.
async fn bling_client() -> Result<BlingClient, CliError> {
    let config = BlingConfig::from_env()?;
    let store = Arc::new(PgTokenStore::new(connect().await?));
    Ok(BlingClient::new(config, store)?)
}

/// Print a value as pretty JSON on stdout.
fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
