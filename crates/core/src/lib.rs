//! Iradah Core - Shared types library.
//!
//! This crate provides the types shared by every Iradah component:
//! - `storefront` - Shopify client, cart store and JSON API
//! - `cli` - Command-line access to the catalog and checkout
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Decimal prices, currency codes and Shopify identifier newtypes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
