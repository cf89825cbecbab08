//! Cart route handlers.
//!
//! `GET /varukorg` renders the cart page; the cart itself streams in once
//! the query resolves. `POST /varukorg` is the single endpoint every cart
//! form on the site submits to (see [`crate::cart`]). Cart IDs are stored
//! in the session and map to Shopify carts.

use askama::Template;
use axum::{
    Form, Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use stallmagneten_core::variant::{filter_default_title, variant_url};
use tracing::instrument;

use super::products::{ImageView, PRODUCTS_PATH, UpsellView};
use crate::cart::{CartActionForm, CartActionKind, CartHandler, form_input};
use crate::context::{Layout, RequestContext, RootData};
use crate::deferred::{Deferred, DeferredError};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::shopify::types::{Cart, CartId, CartLine, CartUserError, cart_upsells};
use crate::state::AppState;

/// Path of the cart page and the cart form endpoint.
pub const CART_PATH: &str = "/varukorg";

// =============================================================================
// View types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub title: String,
    pub url: String,
    /// `"Storlek: M"` etc., without Shopify's default title option
    pub options: Vec<String>,
    pub image: Option<ImageView>,
    pub quantity: i64,
    pub price: String,
    pub compare_at: Option<String>,
    pub decrease_input: String,
    pub increase_input: String,
    pub remove_input: String,
}

impl CartLineView {
    /// Decreasing below one is done with the remove button.
    #[must_use]
    pub const fn can_decrease(&self) -> bool {
        self.quantity > 1
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let merchandise = &line.merchandise;
        let product = &merchandise.product;
        let update = |quantity: i64| {
            form_input(
                CartActionKind::LinesUpdate,
                json!({ "lines": [{ "id": line.id, "quantity": quantity }] }),
            )
        };

        Self {
            title: product.title.clone(),
            url: variant_url(
                PRODUCTS_PATH,
                &product.handle,
                &merchandise.selected_options,
                &[],
            ),
            options: filter_default_title(&merchandise.selected_options)
                .into_iter()
                .map(|option| format!("{}: {}", option.name, option.value))
                .collect(),
            image: merchandise
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &product.title)),
            quantity: line.quantity,
            price: line.cost.total_amount.without_decimals(),
            compare_at: line
                .cost
                .compare_at_amount_per_quantity
                .as_ref()
                .filter(|money| !money.is_zero())
                .map(|money| money.without_decimals()),
            decrease_input: update((line.quantity - 1).max(1)),
            increase_input: update(line.quantity + 1),
            remove_input: form_input(
                CartActionKind::LinesRemove,
                json!({ "lineIds": [line.id] }),
            ),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub total: String,
    pub checkout_url: String,
    pub discount_codes: Vec<String>,
    /// Hidden input applying a typed code on top of the current ones
    pub discount_input: String,
    /// Hidden input clearing every code
    pub remove_discounts_input: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let current_codes = cart.discount_code_list();

        Self {
            lines: cart.lines.iter().map(CartLineView::from).collect(),
            subtotal: cart.cost.subtotal_amount.without_decimals(),
            total: cart.cost.total_amount.without_decimals(),
            checkout_url: cart.checkout_url.clone(),
            discount_codes: cart
                .applicable_discount_codes()
                .into_iter()
                .map(|code| code.code.clone())
                .collect(),
            discount_input: form_input(
                CartActionKind::DiscountCodesUpdate,
                json!({ "discountCodes": current_codes }),
            ),
            remove_discounts_input: form_input(
                CartActionKind::DiscountCodesUpdate,
                json!({ "discountCodes": [] }),
            ),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
}

/// Cart contents, streamed into the cart page.
#[derive(Template)]
#[template(path = "partials/cart.html")]
pub struct CartTemplate {
    /// `None` when the visitor has no cart or it is empty
    pub cart: Option<CartView>,
    pub upsells: Vec<UpsellView>,
    pub cart_path: &'static str,
}

/// Cart contents plus the upsells that apply to it.
#[derive(Clone)]
struct CartSection {
    cart: Option<Cart>,
    upsells: Vec<UpsellView>,
}

impl CartSection {
    fn render(self) -> askama::Result<String> {
        CartTemplate {
            cart: self
                .cart
                .as_ref()
                .filter(|cart| !cart.is_empty())
                .map(CartView::from),
            upsells: self.upsells,
            cart_path: CART_PATH,
        }
        .render()
    }
}

/// JSON body returned for cart form submissions.
#[derive(Debug, Serialize)]
pub struct CartActionResponse {
    pub cart: Option<Cart>,
    pub errors: Vec<CartUserError>,
    pub analytics: CartAnalytics,
}

/// Analytics payload of a cart action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAnalytics {
    pub cart_id: Option<CartId>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, ctx))]
pub async fn show(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    let root = RootData::load(&state, &ctx).await?;

    let section = {
        let cart = root.cart.clone();
        let options = root.cart_upsell_options.clone();
        let products = root.upsell_products.clone();
        Deferred::spawn(async move {
            let cart = cart.resolve().await?;
            // Upsells are optional; a failed query just hides them
            let (options, products) = futures::join!(options.resolve(), products.resolve());
            let upsells = cart_upsells(
                &options.unwrap_or_default(),
                &products.unwrap_or_default(),
                cart.as_ref(),
            )
            .iter()
            .map(UpsellView::from)
            .collect();

            Ok::<_, DeferredError>(CartSection { cart, upsells })
        })
    };

    let html = CartShowTemplate {
        layout: root.layout(&ctx, "Varukorg"),
    }
    .render()?;

    Ok(root
        .stream(&ctx, html)
        .section("cart", section, CartSection::render, "Ett problem uppstod")
        .into_response())
}

/// Handle a cart form submission.
///
/// Runs the submitted action, stores the resulting cart ID in the session
/// and either redirects (`303`) to the form's `redirectTo` or returns the
/// cart as JSON.
#[instrument(skip(state, ctx, fields), fields(cart = ctx.cart_id.is_some()))]
pub async fn action(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = CartActionForm::parse(&fields)?;
    let kind = form.action.kind();

    add_breadcrumb("cart", kind.as_str(), None);

    let handler = CartHandler::new(
        state.storefront(),
        ctx.cart_id.clone(),
        ctx.customer_access_token.clone(),
    );
    let result = handler.dispatch(form.action).await?;

    let cart_id = result
        .cart
        .as_ref()
        .map(|cart| cart.id.clone())
        .or_else(|| ctx.cart_id.clone());

    if let Some(cart_id) = &cart_id {
        if ctx.cart_id.as_ref() != Some(cart_id) {
            tracing::info!(cart_id = %cart_id, "Storing cart in session");
        }
        ctx.set_cart_id(cart_id).await?;
    }

    if !result.errors.is_empty() {
        tracing::warn!(action = %kind, errors = ?result.errors, "Cart action returned user errors");
    }

    let body = Json(CartActionResponse {
        cart: result.cart,
        errors: result.errors,
        analytics: CartAnalytics { cart_id },
    });

    Ok(match form.redirect_to {
        Some(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)], body).into_response(),
        None => body.into_response(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::{Value, json};
    use stallmagneten_core::SelectedOption;

    use super::*;
    use crate::shopify::types::{
        CartCost, CartDiscountCode, CartLineCost, CartLineId, CartMerchandise,
        CartMerchandiseProduct, Money, ProductId, VariantId,
    };

    fn sek(amount: &str) -> Money {
        Money::new(amount.parse().unwrap(), "SEK")
    }

    fn cart() -> Cart {
        Cart {
            id: CartId::from("gid://shopify/Cart/c1"),
            checkout_url: "https://stallmagneten.se/cart/c/c1".to_string(),
            total_quantity: 2,
            cost: CartCost {
                subtotal_amount: sek("2598"),
                total_amount: sek("2598"),
            },
            lines: vec![CartLine {
                id: CartLineId::from("gid://shopify/CartLine/l1"),
                quantity: 2,
                cost: CartLineCost {
                    amount_per_quantity: sek("1299"),
                    total_amount: sek("2598"),
                    compare_at_amount_per_quantity: None,
                },
                merchandise: CartMerchandise {
                    id: VariantId::from("gid://shopify/ProductVariant/v1"),
                    title: "M".to_string(),
                    image: None,
                    selected_options: vec![SelectedOption::new("Storlek", "M")],
                    product: CartMerchandiseProduct {
                        id: ProductId::from("gid://shopify/Product/p1"),
                        handle: "stallmagneten".to_string(),
                        title: "Stallmagneten".to_string(),
                    },
                },
            }],
            discount_codes: vec![
                CartDiscountCode {
                    code: "HOST10".to_string(),
                    applicable: true,
                },
                CartDiscountCode {
                    code: "GAMMAL".to_string(),
                    applicable: false,
                },
            ],
        }
    }

    fn input(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_line_view_quantity_forms() {
        let cart = cart();
        let view = CartLineView::from(&cart.lines[0]);
        assert_eq!(view.options, vec!["Storlek: M"]);
        assert_eq!(view.price, "2598 kr");
        assert!(view.can_decrease());
        assert_eq!(view.url, "/produkter/stallmagneten?Storlek=M");

        let decrease = input(&view.decrease_input);
        assert_eq!(decrease["action"], "LinesUpdate");
        assert_eq!(decrease["inputs"]["lines"][0]["quantity"], 1);
        assert_eq!(input(&view.increase_input)["inputs"]["lines"][0]["quantity"], 3);

        let remove = input(&view.remove_input);
        assert_eq!(remove["action"], "LinesRemove");
        assert_eq!(remove["inputs"]["lineIds"][0], "gid://shopify/CartLine/l1");
    }

    #[test]
    fn test_cart_view_discounts() {
        let view = CartView::from(&cart());
        assert_eq!(view.discount_codes, vec!["HOST10"]);
        assert_eq!(view.total, "2598 kr");

        let apply = input(&view.discount_input);
        assert_eq!(apply["action"], "DiscountCodesUpdate");
        assert_eq!(apply["inputs"]["discountCodes"], json!(["HOST10", "GAMMAL"]));
        assert_eq!(
            input(&view.remove_discounts_input)["inputs"]["discountCodes"],
            json!([])
        );
    }

    #[test]
    fn test_empty_cart_renders_message() {
        let html = CartSection {
            cart: None,
            upsells: Vec::new(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Din varukorg är tom"));
    }

    #[test]
    fn test_cart_renders_checkout_link() {
        let html = CartSection {
            cart: Some(cart()),
            upsells: Vec::new(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Fortsätt till Kassan"));
        assert!(html.contains("https://stallmagneten.se/cart/c/c1"));
        assert!(html.contains("name=\"cartFormInput\""));
    }

    #[test]
    fn test_action_response_shape() {
        let body = serde_json::to_value(CartActionResponse {
            cart: None,
            errors: vec![CartUserError::message("Cart not found")],
            analytics: CartAnalytics {
                cart_id: Some("gid://shopify/Cart/c1".into()),
            },
        })
        .unwrap();
        assert_eq!(body["analytics"]["cartId"], "gid://shopify/Cart/c1");
        assert_eq!(body["errors"][0]["message"], "Cart not found");
        assert!(body["cart"].is_null());
    }
}
