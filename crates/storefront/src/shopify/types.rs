//! Domain types for Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw GraphQL
//! response shapes in `storefront::queries` (no `edges`/`node` wrappers,
//! prices already parsed into decimals).

use iradah_core::{CartId, Handle, Price, ProductId, VariantId};
use serde::{Deserialize, Serialize};
use url::Url;

// =============================================================================
// Image Types
// =============================================================================

/// Product or variant image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Price,
    /// Maximum price among all variants.
    pub max_variant_price: Price,
}

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Size", "Color").
    pub name: String,
    /// Selected value (e.g., "Large", "Black").
    pub value: String,
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values (e.g., `["S", "M", "L"]`).
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Current price.
    pub price: Price,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Price>,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
}

impl ProductVariant {
    /// Option values joined for display, e.g. `"M / Black"`.
    #[must_use]
    pub fn options_label(&self) -> String {
        self.selected_options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: Handle,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// All product images.
    pub images: Vec<Image>,
    /// Product options.
    pub options: Vec<ProductOption>,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// The first variant, used for quick-add and as the default selection.
    #[must_use]
    pub fn first_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// The first image, if any.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }

    /// Lowest variant price, used for listing and sorting.
    #[must_use]
    pub const fn min_price(&self) -> &Price {
        &self.price_range.min_variant_price
    }

    /// Whether the quick-add variant can be bought.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        !self.first_variant().is_some_and(|v| v.available_for_sale)
    }
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// Paginated list of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConnection {
    /// Products in this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub page_info: PageInfo,
}

// =============================================================================
// Checkout Types
// =============================================================================

/// Input for one line of a checkout cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: VariantId,
    /// Quantity to buy.
    pub quantity: u32,
}

/// Hosted checkout created from the local cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Remote cart ID.
    pub cart_id: CartId,
    /// URL the buyer is sent to in order to pay.
    pub checkout_url: Url,
    /// Total item quantity as seen by Shopify.
    pub total_quantity: u32,
    /// Total amount as computed by Shopify, when reported.
    pub total: Option<Price>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant(id: &str, available: bool, options: &[(&str, &str)]) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(id),
            title: id.to_string(),
            available_for_sale: available,
            price: Price::parse("100", "PKR").unwrap(),
            compare_at_price: None,
            selected_options: options
                .iter()
                .map(|(name, value)| SelectedOption {
                    name: (*name).to_string(),
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    fn product(variants: Vec<ProductVariant>) -> Product {
        let price = Price::parse("100", "PKR").unwrap();
        Product {
            id: ProductId::new("gid://shopify/Product/1"),
            handle: Handle::new("hoodie"),
            title: "Hoodie".to_string(),
            description: String::new(),
            price_range: PriceRange {
                min_variant_price: price.clone(),
                max_variant_price: price,
            },
            images: Vec::new(),
            options: Vec::new(),
            variants,
        }
    }

    #[test]
    fn test_options_label() {
        let v = variant("v1", true, &[("Size", "M"), ("Color", "Black")]);
        assert_eq!(v.options_label(), "M / Black");
    }

    #[test]
    fn test_variant_lookup() {
        let p = product(vec![variant("v1", true, &[]), variant("v2", true, &[])]);
        assert_eq!(p.first_variant().unwrap().id.as_str(), "v1");
        assert!(p.variant(&VariantId::new("v2")).is_some());
        assert!(p.variant(&VariantId::new("v3")).is_none());
    }

    #[test]
    fn test_sold_out_follows_first_variant() {
        assert!(!product(vec![variant("v1", true, &[])]).is_sold_out());
        assert!(product(vec![variant("v1", false, &[])]).is_sold_out());
        assert!(product(vec![]).is_sold_out());
    }
}
