//! Integration tests for cart form actions.
//!
//! Each test posts `cartFormInput` forms to `/varukorg` and checks both the
//! JSON the storefront returns and the Storefront API calls it makes.

use axum::http::StatusCode;
use serde_json::{Value, json};
use stallmagneten_integration_tests::{TestStorefront, fixtures};
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;

const LINE_1: &str = "gid://shopify/CartLine/l1";
const LINE_2: &str = "gid://shopify/CartLine/l2";

fn form_input(action: &str, inputs: &Value) -> String {
    json!({ "action": action, "inputs": inputs }).to_string()
}

fn add_m() -> String {
    form_input(
        "LinesAdd",
        &json!({ "lines": [{ "merchandiseId": "gid://shopify/ProductVariant/m", "quantity": 1 }] }),
    )
}

/// Respond to `operation` with `cart` under `field`, expecting exactly one call.
async fn mock_mutation(store: &TestStorefront, operation: &str, field: &str, cart: Value) {
    TestStorefront::operation(operation)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { field: fixtures::cart_payload(cart) }
        })))
        .expect(1)
        .mount(&store.shopify)
        .await;
}

// =============================================================================
// Lines
// =============================================================================

#[tokio::test]
async fn test_lines_add_without_cart_creates_one() {
    let mut store = TestStorefront::start().await;
    mock_mutation(
        &store,
        "CartCreate",
        "cartCreate",
        fixtures::cart(&[fixtures::cart_line(LINE_1, 1)]),
    )
    .await;

    let response = store
        .post_form("/varukorg", &[("cartFormInput", &add_m())])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["cart"]["id"], fixtures::CART_ID);
    assert_eq!(body["analytics"]["cartId"], fixtures::CART_ID);
    assert_eq!(body["errors"], json!([]));
    assert!(
        response.headers.contains_key("set-cookie"),
        "new cart ID should be stored in the session"
    );
}

#[tokio::test]
async fn test_follow_up_action_uses_session_cart() {
    let mut store = TestStorefront::start().await;
    mock_mutation(
        &store,
        "CartCreate",
        "cartCreate",
        fixtures::cart(&[fixtures::cart_line(LINE_1, 1)]),
    )
    .await;
    TestStorefront::operation("CartLinesUpdate")
        .and(body_partial_json(json!({
            "variables": {
                "cartId": fixtures::CART_ID,
                "lines": [{ "id": LINE_1, "quantity": 3 }]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "cartLinesUpdate": fixtures::cart_payload(fixtures::cart(&[
                    fixtures::cart_line(LINE_1, 3)
                ]))
            }
        })))
        .expect(1)
        .mount(&store.shopify)
        .await;

    store
        .post_form("/varukorg", &[("cartFormInput", &add_m())])
        .await;

    let update = form_input("LinesUpdate", &json!({ "lines": [{ "id": LINE_1, "quantity": 3 }] }));
    let response = store
        .post_form("/varukorg", &[("cartFormInput", &update)])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["cart"]["totalQuantity"], 3);
    assert_eq!(body["analytics"]["cartId"], fixtures::CART_ID);
}

#[tokio::test]
async fn test_lines_update_without_cart_reports_cart_not_found() {
    let mut store = TestStorefront::start().await;
    TestStorefront::operation("CartLinesUpdate")
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&store.shopify)
        .await;
    TestStorefront::operation("CartCreate")
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&store.shopify)
        .await;

    let update = form_input("LinesUpdate", &json!({ "lines": [{ "id": LINE_1, "quantity": 2 }] }));
    let response = store
        .post_form("/varukorg", &[("cartFormInput", &update)])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["cart"], Value::Null);
    assert_eq!(body["errors"][0]["message"], "Cart not found");
}

#[tokio::test]
async fn test_lines_remove_sends_every_line_id() {
    let mut store = TestStorefront::start().await;
    mock_mutation(
        &store,
        "CartCreate",
        "cartCreate",
        fixtures::cart(&[fixtures::cart_line(LINE_1, 1), fixtures::cart_line(LINE_2, 1)]),
    )
    .await;
    TestStorefront::operation("CartLinesRemove")
        .and(body_partial_json(json!({
            "variables": { "cartId": fixtures::CART_ID, "lineIds": [LINE_1, LINE_2] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "cartLinesRemove": fixtures::cart_payload(fixtures::cart(&[])) }
        })))
        .expect(1)
        .mount(&store.shopify)
        .await;

    store
        .post_form("/varukorg", &[("cartFormInput", &add_m())])
        .await;

    let remove = form_input("LinesRemove", &json!({ "lineIds": [LINE_1, LINE_2] }));
    let response = store
        .post_form("/varukorg", &[("cartFormInput", &remove)])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["cart"]["totalQuantity"], 0);
}

// =============================================================================
// Discount codes and buyer identity
// =============================================================================

#[tokio::test]
async fn test_typed_discount_code_goes_before_applied_codes() {
    let mut store = TestStorefront::start().await;
    TestStorefront::operation("CartCreate")
        .and(body_partial_json(json!({
            "variables": { "input": { "discountCodes": ["VINTER", "HOST10"] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "cartCreate": fixtures::cart_payload(fixtures::cart(&[])) }
        })))
        .expect(1)
        .mount(&store.shopify)
        .await;

    let input = form_input("DiscountCodesUpdate", &json!({ "discountCodes": ["HOST10"] }));
    let response = store
        .post_form(
            "/varukorg",
            &[("cartFormInput", &input), ("discountCode", "VINTER")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["analytics"]["cartId"], fixtures::CART_ID);
}

#[tokio::test]
async fn test_buyer_identity_update_creates_cart() {
    let mut store = TestStorefront::start().await;
    TestStorefront::operation("CartCreate")
        .and(body_partial_json(json!({
            "variables": { "input": { "buyerIdentity": { "countryCode": "SE" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "cartCreate": fixtures::cart_payload(fixtures::cart(&[])) }
        })))
        .expect(1)
        .mount(&store.shopify)
        .await;

    let input = form_input(
        "BuyerIdentityUpdate",
        &json!({ "buyerIdentity": { "countryCode": "SE" } }),
    );
    let response = store
        .post_form("/varukorg", &[("cartFormInput", &input)])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["cart"]["id"], fixtures::CART_ID);
}

// =============================================================================
// Redirects and rejected forms
// =============================================================================

#[tokio::test]
async fn test_redirect_to_answers_see_other() {
    let mut store = TestStorefront::start().await;
    mock_mutation(
        &store,
        "CartCreate",
        "cartCreate",
        fixtures::cart(&[fixtures::cart_line(LINE_1, 1)]),
    )
    .await;

    let response = store
        .post_form(
            "/varukorg",
            &[("cartFormInput", &add_m()), ("redirectTo", "/varukorg")],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/varukorg"));
}

#[tokio::test]
async fn test_off_site_redirect_is_ignored() {
    let mut store = TestStorefront::start().await;
    mock_mutation(
        &store,
        "CartCreate",
        "cartCreate",
        fixtures::cart(&[fixtures::cart_line(LINE_1, 1)]),
    )
    .await;

    let response = store
        .post_form(
            "/varukorg",
            &[("cartFormInput", &add_m()), ("redirectTo", "https://example.com/")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.location(), None);
}

#[tokio::test]
async fn test_missing_action_is_rejected() {
    let mut store = TestStorefront::start().await;

    let response = store
        .post_form("/varukorg", &[("discountCode", "VINTER")])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    let mut store = TestStorefront::start().await;
    TestStorefront::operation("CartCreate")
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&store.shopify)
        .await;

    let input = form_input("NoteUpdate", &json!({ "note": "Leverera till stallet" }));
    let response = store
        .post_form("/varukorg", &[("cartFormInput", &input)])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("NoteUpdate"));
}
