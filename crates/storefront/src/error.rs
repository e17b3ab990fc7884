//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; error bodies are JSON `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::cart::{CartError, CheckoutBlocked, CheckoutError};
use crate::catalog::CatalogError;
use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Cart mutation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog lookup failed (unknown collection, variant, sold out...).
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout could not start or Shopify refused it.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(ShopifyError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Shopify(ShopifyError::RateLimited(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Shopify(_) | Self::Checkout(CheckoutError::Failed(_)) => StatusCode::BAD_GATEWAY,
            Self::Checkout(CheckoutError::Blocked(CheckoutBlocked::InFlight)) => {
                StatusCode::CONFLICT
            }
            Self::Checkout(CheckoutError::Blocked(CheckoutBlocked::EmptyCart)) | Self::Cart(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Catalog(err) => match err {
                CatalogError::InvalidSort(_) => StatusCode::BAD_REQUEST,
                CatalogError::UnknownCollection(_) => StatusCode::NOT_FOUND,
                CatalogError::NoVariants(_) | CatalogError::VariantNotFound { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CatalogError::SoldOut { .. } => StatusCode::CONFLICT,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Shopify(ShopifyError::NotFound(what)) => what.clone(),
            Self::Shopify(ShopifyError::RateLimited(_)) => {
                "Store is busy, please try again shortly".to_string()
            }
            Self::Shopify(_) => "External service error".to_string(),
            Self::Checkout(CheckoutError::Failed(_)) => {
                "Checkout could not be created, please try again".to_string()
            }
            Self::Cart(err) => err.to_string(),
            Self::Catalog(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(what) => what.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
