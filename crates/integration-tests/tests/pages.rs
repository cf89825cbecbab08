//! Integration tests for page rendering.
//!
//! These run full page requests through the middleware stack, with the
//! deferred sections resolved into the collected body.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::json;
use stallmagneten_integration_tests::{TestStorefront, fixtures};

// =============================================================================
// Home
// =============================================================================

#[tokio::test]
async fn test_home_renders_without_optional_sections() {
    let mut store = TestStorefront::start().await;

    let response = store.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<title>Stallmagneten | Produkter för ett säkrare stall</title>"));
    assert!(response.body.contains("Städa upp efter skoningen"));
    assert!(
        response.body.contains("Ett problem uppstod"),
        "unmocked recommended products should render the error element"
    );
}

// =============================================================================
// Product pages
// =============================================================================

#[tokio::test]
async fn test_product_without_selection_redirects_to_first_variant() {
    let mut store = TestStorefront::start().await;
    store.mock("Product", fixtures::product(None)).await;

    let response = store.get("/produkter/stallmagneten").await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/produkter/stallmagneten?Storlek=M"));
}

#[tokio::test]
async fn test_product_with_selection_renders() {
    let mut store = TestStorefront::start().await;
    let selected = fixtures::variants().remove(0);
    store.mock("Product", fixtures::product(Some(selected))).await;
    store
        .mock("ProductVariants", fixtures::product_variants())
        .await;

    let response = store.get("/produkter/stallmagneten?Storlek=M").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Stallmagneten | Stallmagneten"));
    assert!(response.body.contains("Lägg i varukorgen"));
    assert!(response.body.contains("name=\"cartFormInput\""));
}

#[tokio::test]
async fn test_header_and_product_queries_run_concurrently() {
    let mut store = TestStorefront::start().await;
    let delay = Duration::from_millis(400);
    let selected = fixtures::variants().remove(0);
    store
        .mock_delayed("Header", fixtures::header(), delay)
        .await;
    store
        .mock_delayed("Product", fixtures::product(Some(selected)), delay)
        .await;
    store
        .mock("ProductVariants", fixtures::product_variants())
        .await;

    let started = Instant::now();
    let response = store.get("/produkter/stallmagneten?Storlek=M").await;
    let elapsed = started.elapsed();

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        elapsed < Duration::from_millis(750),
        "header and product were fetched one after the other ({elapsed:?})"
    );
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut store = TestStorefront::start().await;
    store.mock("Product", json!({ "product": null })).await;

    let response = store.get("/produkter/finns-inte").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Oops"));
}

// =============================================================================
// Content pages
// =============================================================================

#[tokio::test]
async fn test_markdown_page_renders_with_layout() {
    let mut store = TestStorefront::start().await;

    let response = store.get("/om-oss").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<title>Stallmagneten | Om oss</title>"));
    assert!(response.body.contains("Stallmagneten föddes i stallet."));
    assert!(response.body.contains("href=\"/produkter\""));
    assert!(
        !response.body.contains("/blogs/blogg"),
        "hidden menu links should not render"
    );
}

#[tokio::test]
async fn test_missing_markdown_page_is_not_found() {
    let mut store = TestStorefront::start().await;

    let response = store.get("/kontakt").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_policies_is_not_found() {
    let mut store = TestStorefront::start().await;
    store
        .mock(
            "Policies",
            json!({
                "shop": {
                    "privacyPolicy": null,
                    "shippingPolicy": null,
                    "termsOfService": null,
                    "refundPolicy": null
                }
            }),
        )
        .await;

    let response = store.get("/policyer").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_policies_are_listed() {
    let mut store = TestStorefront::start().await;
    store
        .mock(
            "Policies",
            json!({
                "shop": {
                    "privacyPolicy": null,
                    "shippingPolicy": null,
                    "termsOfService": null,
                    "refundPolicy": {
                        "id": "gid://shopify/ShopPolicy/1",
                        "handle": "refund-policy",
                        "title": "Returpolicy",
                        "body": "<p>30 dagars öppet köp</p>"
                    }
                }
            }),
        )
        .await;

    let response = store.get("/policyer").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("href=\"/policyer/refund-policy\""));

    let response = store.get("/policyer/refund-policy").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("30 dagars öppet köp"));
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_health() {
    let mut store = TestStorefront::start().await;

    let response = store.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_unknown_path_renders_error_page() {
    let mut store = TestStorefront::start().await;

    let response = store.get("/finns/inte").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Oops"));
    assert!(response.body.contains("404"));
}

#[tokio::test]
async fn test_cart_page_renders_empty_cart() {
    let mut store = TestStorefront::start().await;

    let response = store.get("/varukorg").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<title>Stallmagneten | Varukorg</title>"));
    assert!(response.body.contains("Din varukorg är tom"));
}
