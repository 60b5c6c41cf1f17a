//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! mf-cli migrate
//! ```
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`

use super::{CliError, connect};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
