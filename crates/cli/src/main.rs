//! Iradah CLI - catalog browsing and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List products, cheapest first
//! iradah products --sort price-low --limit 20
//!
//! # Show one product with its variants
//! iradah product classic-hoodie
//!
//! # List a category
//! iradah collection hoodies
//!
//! # Build a cart and print its Shopify checkout URL
//! iradah checkout classic-hoodie=2 everyday-sweatshirt:4242=1
//! ```
//!
//! # Environment Variables
//!
//! Same as the storefront server: `SHOPIFY_STORE` and
//! `SHOPIFY_STOREFRONT_TOKEN` are required, `.env` is loaded if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use iradah_storefront::catalog::SortOrder;
use iradah_storefront::config::StorefrontConfig;
use iradah_storefront::shopify::StorefrontClient;

mod commands;

#[derive(Parser)]
#[command(name = "iradah")]
#[command(author, version, about = "Iradah storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Sort order (`featured`, `price-low`, `price-high`, `name`)
        #[arg(short, long, default_value = "featured")]
        sort: SortOrder,

        /// Number of products to fetch (defaults to `STOREFRONT_PRODUCT_LIMIT`)
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Show a product and its variants
    Product {
        /// Product handle
        handle: String,
    },
    /// List the products of a category
    Collection {
        /// Category slug (`hoodies`, `sweatshirts`, `trousers`)
        category: String,
    },
    /// Create a Shopify checkout and print its URL
    Checkout {
        /// Items as `handle[:variant]=quantity`; variant is a variant ID or
        /// its trailing number, quantity defaults to 1
        #[arg(required = true)]
        items: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to warnings only so command output stays readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let client = StorefrontClient::new(&config.shopify);

    match cli.command {
        Commands::Products { sort, limit } => {
            let limit = limit.unwrap_or(config.product_limit);
            commands::catalog::products(&client, sort, limit).await?;
        }
        Commands::Product { handle } => commands::catalog::product(&client, &handle).await?,
        Commands::Collection { category } => {
            commands::catalog::collection(&client, &category, config.product_limit).await?;
        }
        Commands::Checkout { items } => {
            let items = items
                .iter()
                .map(|raw| raw.parse())
                .collect::<Result<Vec<_>, _>>()?;
            commands::checkout::run(&client, config.currency, &items).await?;
        }
    }
    Ok(())
}
