//! Stallmagneten Core - Shared storefront domain library.
//!
//! This crate provides the pure parts of the storefront that need no I/O:
//! - type-safe Shopify IDs and money formatting
//! - product variant selection from query parameters
//! - cursor pagination variables and links
//!
//! # Architecture
//!
//! The core crate contains only types and functions - no HTTP clients, no
//! templates, no sessions. The `storefront` crate wires these into handlers.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for Shopify IDs and money
//! - [`variant`] - Variant matching, canonical variant URLs and option pickers
//! - [`pagination`] - Cursor pagination over Shopify connections

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod types;
pub mod variant;

pub use pagination::{PageInfo, PaginationDirection, PaginationVariables};
pub use types::*;
pub use variant::{ProductOption, SelectedOption, VariantLike};
