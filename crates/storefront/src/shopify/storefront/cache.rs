//! Cache types for Storefront API responses.

use crate::shopify::types::{Product, ProductConnection};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductConnection),
}
