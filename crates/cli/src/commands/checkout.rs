//! Build a local cart from command-line items and hand it to Shopify.

#![allow(clippy::print_stdout)]

use std::str::FromStr;

use iradah_core::{CurrencyCode, VariantId};
use iradah_storefront::cart::{CartStore, LineItem};
use iradah_storefront::catalog;
use iradah_storefront::shopify::{Product, StorefrontClient};

use super::CliError;

/// One `handle[:variant]=quantity` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub handle: String,
    /// Full variant ID or its trailing number.
    pub variant: Option<String>,
    pub quantity: u32,
}

impl FromStr for ItemArg {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidItem(s.to_string());

        let (target, quantity) = match s.rsplit_once('=') {
            Some((target, quantity)) => (target, quantity.parse().map_err(|_| invalid())?),
            None => (s, 1),
        };
        // Full variant IDs contain ':' themselves, so split on the first one
        let (handle, variant) = match target.split_once(':') {
            Some((handle, variant)) => (handle, Some(variant.to_string())),
            None => (target, None),
        };

        if handle.is_empty() || variant.as_deref() == Some("") {
            return Err(invalid());
        }

        Ok(Self {
            handle: handle.to_string(),
            variant,
            quantity,
        })
    }
}

/// Match a variant argument against the product's variants.
fn variant_id(product: &Product, raw: &str) -> VariantId {
    product
        .variants
        .iter()
        .map(|v| &v.id)
        .find(|id| id.as_str() == raw || id.numeric_part() == Some(raw))
        .cloned()
        .unwrap_or_else(|| VariantId::new(raw))
}

/// Add every item to a fresh cart, then create a checkout.
///
/// # Errors
///
/// Returns an error if a product or variant cannot be found or bought, or if
/// Shopify refuses the checkout.
pub async fn run(
    client: &StorefrontClient,
    currency: CurrencyCode,
    items: &[ItemArg],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = CartStore::new(currency);

    for item in items {
        let product = client.get_product_by_handle(&item.handle).await?;
        let requested = item.variant.as_deref().map(|raw| variant_id(&product, raw));
        let variant = catalog::purchasable_variant(&product, requested.as_ref(), None)?;
        cart.add_item(LineItem::from_variant(&product, variant, item.quantity)?)?;
    }

    for line in cart.items() {
        println!(
            "  {:>3} x {:<40} {:>14}",
            line.quantity,
            format!("{} ({})", line.product.title, line.variant_title),
            line.line_total().display()
        );
    }
    println!("  {} items, subtotal {}", cart.total_items(), cart.total_price());

    let session = cart.try_checkout(client).await?;
    if let Some(total) = &session.total {
        println!("  Shopify total {total}");
    }
    println!("{}", session.checkout_url);
    Ok(())
}
