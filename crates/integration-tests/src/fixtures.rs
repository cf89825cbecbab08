//! Storefront API response fixtures, in the wire format Shopify returns.

use serde_json::{Value, json};

/// Cart ID used by the cart fixtures.
pub const CART_ID: &str = "gid://shopify/Cart/c1";

fn money(amount: &str) -> Value {
    json!({ "amount": amount, "currencyCode": "SEK" })
}

/// Header query data: shop info and a main menu with a hidden blog link.
#[must_use]
pub fn header() -> Value {
    json!({
        "shop": {
            "id": "gid://shopify/Shop/1",
            "name": "Stallmagneten",
            "description": null,
            "primaryDomain": { "url": "https://stallmagneten.se" }
        },
        "menu": {
            "id": "gid://shopify/Menu/1",
            "items": [
                {
                    "id": "gid://shopify/MenuItem/1",
                    "title": "Produkter",
                    "url": "https://stallmagneten.se/produkter",
                    "items": []
                },
                {
                    "id": "gid://shopify/MenuItem/2",
                    "title": "Blogg",
                    "url": "https://stallmagneten.se/blogs/blogg",
                    "items": []
                }
            ]
        }
    })
}

/// Footer query data.
#[must_use]
pub fn footer() -> Value {
    json!({
        "menu": {
            "id": "gid://shopify/Menu/2",
            "items": [{
                "id": "gid://shopify/MenuItem/3",
                "title": "Köpvillkor",
                "url": "https://stallmagneten.myshopify.com/kopvillkor",
                "items": []
            }]
        }
    })
}

/// A cart line of `quantity` units at 1299 kr each.
#[must_use]
pub fn cart_line(id: &str, quantity: i64) -> Value {
    json!({
        "id": id,
        "quantity": quantity,
        "cost": {
            "amountPerQuantity": money("1299.0"),
            "totalAmount": money(&format!("{}.0", 1299 * quantity)),
            "compareAtAmountPerQuantity": null
        },
        "merchandise": {
            "id": "gid://shopify/ProductVariant/m",
            "title": "M",
            "image": null,
            "selectedOptions": [{ "name": "Storlek", "value": "M" }],
            "product": {
                "id": "gid://shopify/Product/1",
                "handle": "stallmagneten",
                "title": "Stallmagneten"
            }
        }
    })
}

/// Cart [`CART_ID`] holding `lines`.
#[must_use]
pub fn cart(lines: &[Value]) -> Value {
    let quantity: i64 = lines
        .iter()
        .filter_map(|line| line["quantity"].as_i64())
        .sum();
    let total = money(&format!("{}.0", 1299 * quantity));

    json!({
        "id": CART_ID,
        "checkoutUrl": "https://stallmagneten.se/cart/c/c1",
        "totalQuantity": quantity,
        "cost": { "subtotalAmount": total, "totalAmount": total },
        "discountCodes": [],
        "lines": { "nodes": lines }
    })
}

/// Mutation payload wrapping `cart` with no user errors.
#[must_use]
pub fn cart_payload(cart: Value) -> Value {
    json!({ "cart": cart, "userErrors": [] })
}

fn variant(id: &str, size: &str, available: bool) -> Value {
    json!({
        "id": id,
        "title": size,
        "availableForSale": available,
        "sku": null,
        "selectedOptions": [{ "name": "Storlek", "value": size }],
        "price": money("1299.0"),
        "compareAtPrice": null,
        "image": null,
        "product": { "title": "Stallmagneten", "handle": "stallmagneten" }
    })
}

/// Every variant of the `stallmagneten` product: M and L, L sold out.
#[must_use]
pub fn variants() -> Vec<Value> {
    vec![
        variant("gid://shopify/ProductVariant/m", "M", true),
        variant("gid://shopify/ProductVariant/l", "L", false),
    ]
}

/// Product query data for `stallmagneten`.
///
/// `selected` is the variant Shopify resolved from the requested options.
#[must_use]
pub fn product(selected: Option<Value>) -> Value {
    let variants = variants();
    json!({
        "product": {
            "id": "gid://shopify/Product/1",
            "handle": "stallmagneten",
            "title": "Stallmagneten",
            "vendor": "Stallmagneten",
            "description": "Magnet för stallgången",
            "descriptionHtml": "<p>Magnet för stallgången</p>",
            "images": { "nodes": [] },
            "options": [{ "name": "Storlek", "values": ["M", "L"] }],
            "metafields": [null, null],
            "selectedVariant": selected,
            "variants": { "nodes": [variants[0].clone()] }
        }
    })
}

/// Product variants query data for `stallmagneten`.
#[must_use]
pub fn product_variants() -> Value {
    json!({ "product": { "variants": { "nodes": variants() } } })
}
