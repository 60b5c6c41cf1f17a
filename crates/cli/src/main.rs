//! Masterferri CLI - Database migrations, Bling tokens and catalog queries.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! mf-cli migrate
//!
//! # Exchange the authorization code from the Bling app install redirect
//! mf-cli tokens authorize --code <code>
//!
//! # Show the stored token (secrets redacted) / force a refresh
//! mf-cli tokens show
//! mf-cli tokens refresh
//!
//! # Query the catalog exactly as the storefront API would
//! mf-cli products list --search pastilha --price-max 200
//! mf-cli products get 16161616
//! mf-cli categories list
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `tokens` - Inspect, seed, authorize and refresh the Bling token record
//! - `products` - List and fetch products through the product service
//! - `categories` - List product categories

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "mf-cli")]
#[command(author, version, about = "Masterferri CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Manage the stored Bling OAuth token
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Query Bling products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Query Bling categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Show the stored token record (secrets redacted)
    Show,
    /// Store a token pair obtained elsewhere
    Set {
        /// Access token
        #[arg(long)]
        access_token: String,

        /// Refresh token
        #[arg(long)]
        refresh_token: String,

        /// Access token lifetime in seconds
        #[arg(long, default_value_t = 21_600)]
        expires_in: i64,

        /// Granted scopes
        #[arg(long)]
        scope: Option<String>,
    },
    /// Exchange an authorization code for a token pair
    Authorize {
        /// Code from the Bling redirect (`?code=...`)
        #[arg(short, long)]
        code: String,
    },
    /// Refresh the access token now
    Refresh,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List in-stock products
    List {
        #[arg(short, long)]
        page: Option<i64>,

        #[arg(short, long)]
        limit: Option<i64>,

        /// Name search
        #[arg(short, long)]
        search: Option<String>,

        /// Minimum price (inclusive)
        #[arg(long)]
        price_min: Option<Decimal>,

        /// Maximum price (inclusive)
        #[arg(long)]
        price_max: Option<Decimal>,

        /// Bling category ID
        #[arg(long)]
        category: Option<i64>,
    },
    /// Show a single product
    Get {
        /// Bling product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List {
        #[arg(short, long)]
        page: Option<i64>,

        #[arg(short, long)]
        limit: Option<i64>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Tokens { action } => match action {
            TokenAction::Show => commands::tokens::show().await?,
            TokenAction::Set {
                access_token,
                refresh_token,
                expires_in,
                scope,
            } => commands::tokens::set(access_token, refresh_token, expires_in, scope).await?,
            TokenAction::Authorize { code } => commands::tokens::authorize(&code).await?,
            TokenAction::Refresh => commands::tokens::refresh().await?,
        },
        Commands::Products { action } => match action {
            ProductAction::List {
                page,
                limit,
                search,
                price_min,
                price_max,
                category,
            } => {
                let filter = masterferri_storefront::bling::ProductFilter {
                    page,
                    limit,
                    search,
                    price_min,
                    price_max,
                    category,
                };
                commands::catalog::list_products(filter).await?;
            }
            ProductAction::Get { id } => commands::catalog::get_product(&id).await?,
        },
        Commands::Categories { action } => match action {
            CategoryAction::List { page, limit } => {
                let filter = masterferri_storefront::bling::CategoryFilter { page, limit };
                commands::catalog::list_categories(filter).await?;
            }
        },
    }
    Ok(())
}
