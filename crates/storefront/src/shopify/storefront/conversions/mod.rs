//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod products;

pub use cart::convert_checkout;
pub use products::{convert_product, convert_product_connection};
