//! Catalog commands: product listing, product detail and collections.

#![allow(clippy::print_stdout)]

use iradah_storefront::catalog::{self, SortOrder};
use iradah_storefront::shopify::{Product, ShopifyError, StorefrontClient};

use super::CliError;

const MAX_LIMIT: i64 = 250;

/// List `limit` products in `sort` order.
///
/// # Errors
///
/// Returns an error for an out-of-range limit or if Shopify fails.
pub async fn products(
    client: &StorefrontClient,
    sort: SortOrder,
    limit: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(CliError::InvalidLimit(limit).into());
    }

    let mut products = client.get_products(limit, None).await?.products;
    sort.apply(&mut products);

    println!("{} products ({sort})", products.len());
    print_table(&products);
    Ok(())
}

/// Show one product with every variant.
///
/// # Errors
///
/// Returns `ShopifyError::NotFound` for an unknown handle.
pub async fn product(client: &StorefrontClient, handle: &str) -> Result<(), ShopifyError> {
    let product = client.get_product_by_handle(handle).await?;

    println!("{} ({})", product.title, product.handle);
    println!("From {}", product.min_price());
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }

    println!();
    for variant in &product.variants {
        let status = if variant.available_for_sale {
            ""
        } else {
            "  [sold out]"
        };
        let id = variant.id.numeric_part().unwrap_or(variant.id.as_str());
        println!(
            "  {id:<16} {:<24} {:>14}{status}",
            variant.options_label(),
            variant.price.display()
        );
    }
    Ok(())
}

/// List the products of one category.
///
/// # Errors
///
/// Returns an error for an unknown category or if Shopify fails.
pub async fn collection(
    client: &StorefrontClient,
    category: &str,
    limit: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let info = catalog::collection(category)?;
    let products = info.select(client.get_products(limit, None).await?.products);

    println!("{}: {}", info.title, info.description);
    print_table(&products);
    Ok(())
}

fn print_table(products: &[Product]) {
    for product in products {
        let status = if product.is_sold_out() {
            "  [sold out]"
        } else {
            ""
        };
        println!(
            "  {:<32} {:<40} {:>14}{status}",
            product.handle.as_str(),
            product.title,
            product.min_price().display()
        );
    }
}
