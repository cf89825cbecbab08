//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /produkter              - Product listing
//! GET  /produkter/{handle}     - Product detail (?Option=Value selects a variant)
//!
//! # Cart
//! GET  /varukorg               - Cart page
//! POST /varukorg               - Cart form actions (rate limited)
//!
//! # Content
//! GET  /blogg                  - Blog articles
//! GET  /blogg/{handle}         - Blog article
//! GET  /sidor/{handle}         - Shopify CMS page
//! GET  /policyer               - Shop policies
//! GET  /policyer/{handle}      - Shop policy
//! GET  /om-oss                 - About (markdown)
//! GET  /kontakt                - Contact (markdown)
//! GET  /kopvillkor             - Terms of purchase (markdown)
//! GET  /returpolicy            - Return policy (markdown)
//! ```

pub mod blog;
pub mod cart;
pub mod home;
pub mod pages;
pub mod policies;
pub mod products;

use axum::{
    Router,
    routing::{MethodRouter, get, post},
};

use crate::error::AppError;
use crate::middleware::cart_rate_limiter;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{handle}", get(products::show))
}

/// Create the cart route: the page and its rate limited form endpoint.
pub fn cart_route() -> MethodRouter<AppState> {
    let action = match cart_rate_limiter() {
        Some(limiter) => post(cart::action).layer(limiter),
        None => {
            tracing::warn!("Cart rate limiter misconfigured, cart actions are not limited");
            post(cart::action)
        }
    };

    get(cart::show).merge(action)
}

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/{handle}", get(blog::show))
}

/// Create the policy routes router.
pub fn policy_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(policies::index))
        .route("/{handle}", get(policies::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/health", get(health))
        // Product routes
        .nest("/produkter", product_routes())
        // Cart page and form actions
        .route(cart::CART_PATH, cart_route())
        // Content
        .nest("/blogg", blog_routes())
        .nest("/policyer", policy_routes())
        .route("/sidor/{handle}", get(pages::cms))
        .route("/om-oss", get(pages::about))
        .route("/kontakt", get(pages::contact))
        .route("/kopvillkor", get(pages::terms))
        .route("/returpolicy", get(pages::returns))
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Render the 404 page for unknown paths.
async fn not_found() -> AppError {
    AppError::NotFound("no route".to_string())
}
