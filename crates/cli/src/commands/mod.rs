//! CLI command implementations.

pub mod catalog;
pub mod checkout;

use thiserror::Error;

/// Errors raised by the CLI itself (as opposed to Shopify or the cart).
#[derive(Debug, Error)]
pub enum CliError {
    /// Product count outside what Shopify accepts.
    #[error("Invalid limit: {0}. Must be between 1 and 250")]
    InvalidLimit(i64),

    /// Checkout item argument could not be parsed.
    #[error("Invalid item '{0}'. Expected handle[:variant]=quantity")]
    InvalidItem(String),
}
