//! Catalog helpers over fetched product lists.
//!
//! Shopify returns products in "featured" order; sorting, the fixed category
//! collections and variant selection are done locally on the fetched list.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use iradah_core::VariantId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shopify::{Product, ProductVariant};

/// How many products a collection shows when none match its search term.
pub const FALLBACK_COLLECTION_SIZE: usize = 8;

/// Errors from catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown sort order {0:?}")]
    InvalidSort(String),
    #[error("unknown collection {0:?}")]
    UnknownCollection(String),
    #[error("product {0} has no variants")]
    NoVariants(String),
    #[error("product {handle} has no variant matching {selection}")]
    VariantNotFound { handle: String, selection: String },
    #[error("{title} is sold out")]
    SoldOut { title: String },
}

// =============================================================================
// Sorting
// =============================================================================

/// Product list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Order returned by Shopify.
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Name,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::Featured, Self::PriceLow, Self::PriceHigh, Self::Name];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Name => "name",
        }
    }

    /// Sort `products` in place. Equal keys keep their relative order.
    ///
    /// Price orders compare the lowest variant price; name order ignores case.
    pub fn apply(self, products: &mut [Product]) {
        match self {
            Self::Featured => {}
            Self::PriceLow => products.sort_by_key(|p| p.min_price().amount),
            Self::PriceHigh => products.sort_by_key(|p| Reverse(p.min_price().amount)),
            Self::Name => products.sort_by_cached_key(|p| p.title.to_lowercase()),
        }
    }
}

impl FromStr for SortOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| CatalogError::InvalidSort(s.to_string()))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Collections
// =============================================================================

/// A fixed product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Shopify search syntax; terms are separated by ` OR `.
    pub query: &'static str,
}

pub const COLLECTIONS: &[CollectionInfo] = &[
    CollectionInfo {
        slug: "hoodies",
        title: "Hoodies",
        description: "Premium hoodies designed for comfort and style.",
        query: "hoodie",
    },
    CollectionInfo {
        slug: "sweatshirts",
        title: "Sweatshirts",
        description: "Everyday essentials for the modern wardrobe.",
        query: "sweatshirt",
    },
    CollectionInfo {
        slug: "trousers",
        title: "Trousers",
        description: "Refined comfort for every occasion.",
        query: "sweatpants OR trousers OR pants",
    },
];

/// Look up a collection by its URL slug.
///
/// # Errors
///
/// Returns `CatalogError::UnknownCollection` for slugs not in [`COLLECTIONS`].
pub fn collection(slug: &str) -> Result<&'static CollectionInfo, CatalogError> {
    COLLECTIONS
        .iter()
        .find(|c| c.slug == slug)
        .ok_or_else(|| CatalogError::UnknownCollection(slug.to_string()))
}

impl CollectionInfo {
    /// The first search term, lower-cased, used for title matching.
    #[must_use]
    pub fn primary_term(&self) -> String {
        self.query
            .split(" OR ")
            .next()
            .unwrap_or(self.query)
            .trim()
            .to_lowercase()
    }

    /// Products whose title contains the primary term, or the first
    /// [`FALLBACK_COLLECTION_SIZE`] products if none do.
    #[must_use]
    pub fn select(&self, products: Vec<Product>) -> Vec<Product> {
        let term = self.primary_term();
        let (matching, rest): (Vec<_>, Vec<_>) = products
            .into_iter()
            .partition(|p| p.title.to_lowercase().contains(&term));

        if matching.is_empty() {
            rest.into_iter().take(FALLBACK_COLLECTION_SIZE).collect()
        } else {
            matching
        }
    }
}

// =============================================================================
// Variant selection
// =============================================================================

/// The buyer's current option choices on a product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelection {
    pub variant_id: Option<VariantId>,
    pub options: BTreeMap<String, String>,
}

impl VariantSelection {
    /// Default selection: the first variant and its options.
    #[must_use]
    pub fn initial(product: &Product) -> Self {
        product
            .first_variant()
            .map_or_else(Self::default, |variant| Self {
                variant_id: Some(variant.id.clone()),
                options: variant
                    .selected_options
                    .iter()
                    .map(|o| (o.name.clone(), o.value.clone()))
                    .collect(),
            })
    }

    /// Set one option and switch to the variant matching all choices.
    ///
    /// If no variant matches the new combination the option is still
    /// recorded but the selected variant does not change.
    pub fn choose(&mut self, product: &Product, name: &str, value: &str) {
        self.options.insert(name.to_string(), value.to_string());
        if let Some(variant) = matching_variant(product, &self.options) {
            self.variant_id = Some(variant.id.clone());
        }
    }

    /// The selected variant, if it still exists on `product`.
    #[must_use]
    pub fn variant<'a>(&self, product: &'a Product) -> Option<&'a ProductVariant> {
        self.variant_id.as_ref().and_then(|id| product.variant(id))
    }
}

fn matching_variant<'a>(
    product: &'a Product,
    options: &BTreeMap<String, String>,
) -> Option<&'a ProductVariant> {
    product.variants.iter().find(|variant| {
        variant
            .selected_options
            .iter()
            .all(|o| options.get(&o.name) == Some(&o.value))
    })
}

/// Pick the variant to add to the cart.
///
/// An explicit `variant_id` wins; otherwise `options` are applied on top of
/// the default selection; with neither, the first variant is used
/// (quick-add).
///
/// # Errors
///
/// Returns `CatalogError::NoVariants` if the product has no variants and
/// `CatalogError::VariantNotFound` if the ID or options match none.
pub fn resolve_variant<'a>(
    product: &'a Product,
    variant_id: Option<&VariantId>,
    options: Option<&BTreeMap<String, String>>,
) -> Result<&'a ProductVariant, CatalogError> {
    if product.variants.is_empty() {
        return Err(CatalogError::NoVariants(product.handle.to_string()));
    }

    if let Some(id) = variant_id {
        return product
            .variant(id)
            .ok_or_else(|| CatalogError::VariantNotFound {
                handle: product.handle.to_string(),
                selection: id.to_string(),
            });
    }

    let mut selection = VariantSelection::initial(product);
    if let Some(options) = options {
        selection.options.extend(options.clone());
        let variant = matching_variant(product, &selection.options).ok_or_else(|| {
            CatalogError::VariantNotFound {
                handle: product.handle.to_string(),
                selection: format_options(options),
            }
        })?;
        return Ok(variant);
    }

    selection
        .variant(product)
        .ok_or_else(|| CatalogError::NoVariants(product.handle.to_string()))
}

/// Refuse variants that cannot be bought.
///
/// # Errors
///
/// Returns `CatalogError::SoldOut` when the variant is not available for sale.
pub fn ensure_available<'a>(
    product: &Product,
    variant: &'a ProductVariant,
) -> Result<&'a ProductVariant, CatalogError> {
    if variant.available_for_sale {
        Ok(variant)
    } else {
        Err(CatalogError::SoldOut {
            title: if product.variants.len() > 1 {
                format!("{} ({})", product.title, variant.title)
            } else {
                product.title.clone()
            },
        })
    }
}

/// [`resolve_variant`] followed by [`ensure_available`].
///
/// # Errors
///
/// See both functions.
pub fn purchasable_variant<'a>(
    product: &'a Product,
    variant_id: Option<&VariantId>,
    options: Option<&BTreeMap<String, String>>,
) -> Result<&'a ProductVariant, CatalogError> {
    let variant = resolve_variant(product, variant_id, options)?;
    ensure_available(product, variant)
}

fn format_options(options: &BTreeMap<String, String>) -> String {
    options
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}
