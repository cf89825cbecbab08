//! Cache types for Storefront API responses.
//!
//! Only slow-changing shop data is cached: menus and policies.

use crate::shopify::types::{Footer, Header, Policy};

/// Cache key for layout and policy data.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Header(String),
    Footer(String),
    Policies,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Header(Box<Header>),
    Footer(Box<Footer>),
    Policies(Vec<Policy>),
}
