//! Shopify Storefront API client.
//!
//! # Architecture
//!
//! - GraphQL documents are declared in `storefront::queries` and sent with
//!   `graphql_client` envelopes over `reqwest`
//! - Shopify is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for product reads (5 minute TTL)
//!
//! # Seams
//!
//! [`StorefrontApi`] is what the HTTP layer and CLI depend on; the cart store
//! only needs the narrower [`CheckoutGateway`]. [`StorefrontClient`]
//! implements both against the live API.
//!
//! # Example
//!
//! ```rust,ignore
//! use iradah_storefront::shopify::{StorefrontApi, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! // Get a product
//! let product = client.get_product_by_handle("classic-hoodie").await?;
//!
//! // Hand the cart over to Shopify checkout
//! let session = client.create_checkout(vec![CartLineInput {
//!     merchandise_id: product.variants[0].id.clone(),
//!     quantity: 1,
//! }]).await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but carried an unusable value.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Build a single-message GraphQL error.
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// API seams
// =============================================================================

/// Creates hosted checkout sessions from local cart lines.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a remote cart holding `lines` and return its checkout URL.
    async fn create_checkout(
        &self,
        lines: Vec<CartLineInput>,
    ) -> Result<CheckoutSession, ShopifyError>;
}

/// Read access to the catalog plus checkout creation.
#[async_trait]
pub trait StorefrontApi: CheckoutGateway {
    /// Fetch up to `first` products, optionally filtered by a search query.
    async fn get_products(
        &self,
        first: i64,
        query: Option<String>,
    ) -> Result<ProductConnection, ShopifyError>;

    /// Fetch a single product by its URL handle.
    async fn get_product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError>;
}
