//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod products;

pub use cart::{convert_cart, convert_cart_payload};
pub use products::convert_product;
