//! Running cart actions against the Storefront API.

use tracing::instrument;

use super::CartAction;
use crate::shopify::types::{
    CartBuyerIdentityInput, CartId, CartInput, CartLineId, CartLineInput, CartLineUpdateInput,
    CartQueryData, CartUserError,
};
use crate::shopify::{ShopifyError, StorefrontClient};

/// User error returned when a line operation targets a missing cart.
pub const CART_NOT_FOUND: &str = "Cart not found";

/// Cart operations bound to one visitor's cart.
///
/// Operations that can start a cart (adding lines, discount codes, buyer
/// identity) create one when the visitor has none yet.
pub struct CartHandler<'a> {
    client: &'a StorefrontClient,
    cart_id: Option<CartId>,
    customer_access_token: Option<String>,
}

impl<'a> CartHandler<'a> {
    /// Bind a handler to the visitor's cart (if any) and customer token.
    #[must_use]
    pub const fn new(
        client: &'a StorefrontClient,
        cart_id: Option<CartId>,
        customer_access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            cart_id,
            customer_access_token,
        }
    }

    /// The cart this handler operates on.
    #[must_use]
    pub const fn cart_id(&self) -> Option<&CartId> {
        self.cart_id.as_ref()
    }

    /// Run the single Storefront API operation `action` maps to.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. User errors are returned
    /// in the result.
    pub async fn dispatch(&self, action: CartAction) -> Result<CartQueryData, ShopifyError> {
        match action {
            CartAction::LinesAdd { lines } => self.add_lines(lines).await,
            CartAction::LinesUpdate { lines } => self.update_lines(lines).await,
            CartAction::LinesRemove { line_ids } => self.remove_lines(line_ids).await,
            CartAction::DiscountCodesUpdate {
                discount_code,
                discount_codes,
            } => {
                // The typed code goes first, then the codes already applied
                let codes = discount_code.into_iter().chain(discount_codes).collect();
                self.update_discount_codes(codes).await
            }
            CartAction::BuyerIdentityUpdate { buyer_identity } => {
                self.update_buyer_identity(buyer_identity).await
            }
        }
    }

    /// Add lines, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn add_lines(&self, lines: Vec<CartLineInput>) -> Result<CartQueryData, ShopifyError> {
        match &self.cart_id {
            Some(cart_id) => self.client.cart_lines_add(cart_id, lines).await,
            None => {
                self.client
                    .cart_create(CartInput {
                        lines,
                        ..CartInput::default()
                    })
                    .await
            }
        }
    }

    /// Update existing lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn update_lines(
        &self,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<CartQueryData, ShopifyError> {
        match &self.cart_id {
            Some(cart_id) => self.client.cart_lines_update(cart_id, lines).await,
            None => Ok(cart_not_found()),
        }
    }

    /// Remove lines by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, line_ids), fields(lines = line_ids.len()))]
    pub async fn remove_lines(
        &self,
        line_ids: Vec<CartLineId>,
    ) -> Result<CartQueryData, ShopifyError> {
        match &self.cart_id {
            Some(cart_id) => self.client.cart_lines_remove(cart_id, line_ids).await,
            None => Ok(cart_not_found()),
        }
    }

    /// Replace the cart's discount codes, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_discount_codes(
        &self,
        discount_codes: Vec<String>,
    ) -> Result<CartQueryData, ShopifyError> {
        match &self.cart_id {
            Some(cart_id) => {
                self.client
                    .cart_discount_codes_update(cart_id, discount_codes)
                    .await
            }
            None => {
                self.client
                    .cart_create(CartInput {
                        discount_codes,
                        ..CartInput::default()
                    })
                    .await
            }
        }
    }

    /// Update who is buying, creating the cart if needed.
    ///
    /// The signed-in customer's access token always wins over one in the
    /// submitted input.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, buyer_identity))]
    pub async fn update_buyer_identity(
        &self,
        buyer_identity: CartBuyerIdentityInput,
    ) -> Result<CartQueryData, ShopifyError> {
        let buyer_identity = CartBuyerIdentityInput {
            customer_access_token: self.customer_access_token.clone(),
            ..buyer_identity
        };

        match &self.cart_id {
            Some(cart_id) => {
                self.client
                    .cart_buyer_identity_update(cart_id, buyer_identity)
                    .await
            }
            None => {
                self.client
                    .cart_create(CartInput {
                        buyer_identity: Some(buyer_identity),
                        ..CartInput::default()
                    })
                    .await
            }
        }
    }
}

fn cart_not_found() -> CartQueryData {
    CartQueryData {
        cart: None,
        errors: vec![CartUserError::message(CART_NOT_FOUND)],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ShopifyStorefrontConfig;

    const CART_ID: &str = "gid://shopify/Cart/c1";

    fn client_for(server: &MockServer) -> StorefrontClient {
        StorefrontClient::new(&ShopifyStorefrontConfig {
            store: "stallmagneten.myshopify.com".to_string(),
            api_version: "2024-01".to_string(),
            storefront_private_token: SecretString::from("shpat_test_token_0123456789abcdef"),
            endpoint: Some(format!("{}/graphql.json", server.uri())),
        })
    }

    fn cart_json(codes: &[&str]) -> Value {
        json!({
            "id": CART_ID,
            "checkoutUrl": "https://stallmagneten.se/cart/c/c1",
            "totalQuantity": 0,
            "cost": {
                "subtotalAmount": { "amount": "0.0", "currencyCode": "SEK" },
                "totalAmount": { "amount": "0.0", "currencyCode": "SEK" }
            },
            "discountCodes": codes.iter().map(|c| json!({ "code": c, "applicable": true })).collect::<Vec<_>>(),
            "lines": { "nodes": [] }
        })
    }

    fn payload(field: &str, codes: &[&str]) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "data": { field: { "cart": cart_json(codes), "userErrors": [] } }
        }))
    }

    #[tokio::test]
    async fn test_add_without_cart_creates_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "operationName": "CartCreate" })))
            .respond_with(payload("cartCreate", &[]))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "operationName": "CartLinesAdd" })))
            .respond_with(payload("cartLinesAdd", &[]))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handler = CartHandler::new(&client, None, None);
        let result = handler
            .dispatch(CartAction::LinesAdd {
                lines: vec![CartLineInput {
                    merchandise_id: "gid://shopify/ProductVariant/1".into(),
                    quantity: Some(1),
                    attributes: None,
                    selling_plan_id: None,
                }],
            })
            .await
            .unwrap();
        assert_eq!(result.cart.unwrap().id.as_str(), CART_ID);
    }

    #[tokio::test]
    async fn test_remove_without_cart_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handler = CartHandler::new(&client, None, None);
        let result = handler
            .dispatch(CartAction::LinesRemove {
                line_ids: vec!["gid://shopify/CartLine/1".into()],
            })
            .await
            .unwrap();
        assert!(result.cart.is_none());
        assert_eq!(result.errors[0].message, CART_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_discount_codes_put_new_code_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "CartDiscountCodesUpdate",
                "variables": { "cartId": CART_ID, "discountCodes": ["NY", "HOST10", "NY"] }
            })))
            .respond_with(payload("cartDiscountCodesUpdate", &["NY", "HOST10"]))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handler = CartHandler::new(&client, Some(CART_ID.into()), None);
        let result = handler
            .dispatch(CartAction::DiscountCodesUpdate {
                discount_code: Some("NY".to_string()),
                discount_codes: vec!["HOST10".to_string(), "NY".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(result.cart.unwrap().discount_code_list(), vec!["NY", "HOST10"]);
    }

    #[tokio::test]
    async fn test_buyer_identity_uses_session_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "CartBuyerIdentityUpdate",
                "variables": { "buyerIdentity": { "countryCode": "SE", "customerAccessToken": "session-token" } }
            })))
            .respond_with(payload("cartBuyerIdentityUpdate", &[]))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handler = CartHandler::new(
            &client,
            Some(CART_ID.into()),
            Some("session-token".to_string()),
        );
        handler
            .dispatch(CartAction::BuyerIdentityUpdate {
                buyer_identity: CartBuyerIdentityInput {
                    country_code: Some("SE".to_string()),
                    customer_access_token: Some("forged".to_string()),
                    ..CartBuyerIdentityInput::default()
                },
            })
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_ne!(
            body["variables"]["buyerIdentity"]["customerAccessToken"],
            "forged"
        );
    }

    #[tokio::test]
    async fn test_user_errors_are_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "cartLinesUpdate": {
                    "cart": cart_json(&[]),
                    "userErrors": [{ "code": "INVALID", "field": ["lines", "0", "quantity"], "message": "Ogiltigt antal" }]
                } }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let handler = CartHandler::new(&client, Some(CART_ID.into()), None);
        let result = handler
            .dispatch(CartAction::LinesUpdate {
                lines: vec![CartLineUpdateInput {
                    id: "gid://shopify/CartLine/1".into(),
                    quantity: Some(-1),
                    merchandise_id: None,
                    attributes: None,
                }],
            })
            .await
            .unwrap();
        assert!(result.cart.is_some());
        assert_eq!(result.errors[0].message, "Ogiltigt antal");
    }
}
