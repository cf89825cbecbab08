//! Cart type conversion functions.

use crate::shopify::types::{Cart, CartQueryData};

use super::super::queries::wire::{CartLineNode, CartMutationPayload, CartNode};

/// Convert a cart node into a [`Cart`], keeping only plain cart lines.
pub fn convert_cart(node: CartNode) -> Cart {
    Cart {
        id: node.id,
        checkout_url: node.checkout_url,
        total_quantity: node.total_quantity,
        cost: node.cost,
        discount_codes: node.discount_codes,
        lines: node
            .lines
            .nodes
            .into_iter()
            .filter_map(|line| match line {
                CartLineNode::Line(line) => Some(*line),
                CartLineNode::Other(_) => None,
            })
            .collect(),
    }
}

/// Convert a mutation payload into [`CartQueryData`].
///
/// A missing payload becomes an empty result; user errors pass through
/// unchanged.
pub fn convert_cart_payload(payload: Option<CartMutationPayload>) -> CartQueryData {
    payload.map_or_else(CartQueryData::default, |p| CartQueryData {
        cart: p.cart.map(convert_cart),
        errors: p.user_errors,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn money(amount: &str) -> serde_json::Value {
        json!({ "amount": amount, "currencyCode": "SEK" })
    }

    #[test]
    fn test_convert_payload_keeps_user_errors_and_cart() {
        let payload: CartMutationPayload = serde_json::from_value(json!({
            "cart": {
                "id": "gid://shopify/Cart/1",
                "checkoutUrl": "https://stallmagneten.se/checkout",
                "totalQuantity": 1,
                "cost": { "subtotalAmount": money("499.0"), "totalAmount": money("499.0") },
                "discountCodes": [{ "code": "HOST10", "applicable": false }],
                "lines": { "nodes": [
                    {
                        "id": "gid://shopify/CartLine/1",
                        "quantity": 1,
                        "cost": {
                            "amountPerQuantity": money("499.0"),
                            "totalAmount": money("499.0"),
                            "compareAtAmountPerQuantity": null
                        },
                        "merchandise": {
                            "id": "gid://shopify/ProductVariant/1",
                            "title": "Default Title",
                            "image": null,
                            "selectedOptions": [{ "name": "Title", "value": "Default Title" }],
                            "product": { "id": "gid://shopify/Product/1", "handle": "stallmagnet", "title": "Stallmagnet" }
                        }
                    },
                    {}
                ] }
            },
            "userErrors": [{ "code": "INVALID", "field": ["discountCodes"], "message": "Koden gäller inte" }]
        }))
        .unwrap();

        let data = convert_cart_payload(Some(payload));
        let cart = data.cart.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.discount_code_list(), vec!["HOST10".to_string()]);
        assert!(cart.applicable_discount_codes().is_empty());
        assert_eq!(data.errors.len(), 1);
        assert_eq!(data.errors[0].message, "Koden gäller inte");
    }

    #[test]
    fn test_convert_missing_payload() {
        assert_eq!(convert_cart_payload(None), CartQueryData::default());
    }
}
