//! Product route handlers.

use askama::Template;
use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::json;
use stallmagneten_core::PaginationVariables;
use stallmagneten_core::variant::{
    VariantOption, VariantResolution, resolve_variant, selected_options_from_query,
    variant_options, variant_url,
};
use tracing::instrument;

use crate::cart::{CartActionKind, form_input};
use crate::context::{Layout, RequestContext, RootData, UPSELL_PRODUCT_COUNT};
use crate::deferred::Deferred;
use crate::error::{AppError, Result};
use crate::filters;
use crate::shopify::types::{
    Image, Money, ProductOption, ProductSummary, ProductVariant, TechnicalDetail, Upsell,
    VariantId, product_upsells, technical_details,
};
use crate::state::AppState;

/// Path all product pages live under.
pub const PRODUCTS_PATH: &str = "/produkter";

/// Products per page on `/produkter`.
const PRODUCTS_PER_PAGE: u32 = 8;

// =============================================================================
// View types
// =============================================================================

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

impl ImageView {
    /// `fallback_alt` is used when the image has no alt text.
    #[must_use]
    pub fn new(image: &Image, fallback_alt: &str) -> Self {
        Self {
            url: image.url.clone(),
            alt: image.alt_or(fallback_alt).to_string(),
        }
    }
}

/// Product card in grids and recommendations.
#[derive(Clone)]
pub struct ProductCardView {
    pub title: String,
    pub url: String,
    pub image: Option<ImageView>,
    pub price: String,
}

impl From<&ProductSummary> for ProductCardView {
    fn from(product: &ProductSummary) -> Self {
        let options = product
            .first_variant()
            .map(|variant| variant.selected_options.as_slice())
            .unwrap_or_default();

        Self {
            title: product.title.clone(),
            url: variant_url(PRODUCTS_PATH, &product.handle, options, &[]),
            image: product
                .featured_image
                .as_ref()
                .map(|image| ImageView::new(image, &product.title)),
            price: product.price_range.min_variant_price.without_decimals(),
        }
    }
}

/// A hidden-input cart form posting one `LinesAdd` action.
#[derive(Clone)]
pub struct AddToCartView {
    pub form_input: String,
    pub label: &'static str,
    pub disabled: bool,
    pub primary: bool,
}

impl AddToCartView {
    /// Form adding one unit of `variant_id`; disabled when not for sale.
    #[must_use]
    pub fn new(variant_id: Option<&VariantId>, available: bool, primary: bool) -> Self {
        let lines = variant_id
            .map(|id| vec![json!({ "merchandiseId": id, "quantity": 1 })])
            .unwrap_or_default();

        Self {
            form_input: form_input(CartActionKind::LinesAdd, json!({ "lines": lines })),
            label: if available {
                "Lägg i varukorgen"
            } else {
                "Slutsåld"
            },
            disabled: !available || variant_id.is_none(),
            primary,
        }
    }
}

/// A complementary product with its pitch and an add button.
#[derive(Clone)]
pub struct UpsellView {
    pub card: ProductCardView,
    pub description: String,
    pub add_to_cart: AddToCartView,
}

impl From<&Upsell> for UpsellView {
    fn from(upsell: &Upsell) -> Self {
        let product = &upsell.product;
        Self {
            card: ProductCardView::from(product),
            description: upsell.description.clone().unwrap_or_default(),
            add_to_cart: AddToCartView::new(
                product.first_variant().map(|variant| &variant.id),
                product.available_for_sale,
                false,
            ),
        }
    }
}

/// Price of the selected variant.
#[derive(Clone)]
pub struct PriceView {
    pub price: String,
    /// Set when the variant is discounted
    pub compare_at: Option<String>,
}

impl PriceView {
    fn new(price: &Money, compare_at: Option<&Money>) -> Self {
        Self {
            price: price.without_decimals(),
            compare_at: compare_at
                .filter(|money| !money.is_zero())
                .map(Money::without_decimals),
        }
    }
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub title: String,
    pub description_html: String,
    pub images: Vec<ImageView>,
}

// =============================================================================
// Templates
// =============================================================================

/// Pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub cursor: Option<String>,
    pub direction: Option<String>,
}

impl PaginationQuery {
    /// Storefront API variables for a page of `page_by` items.
    #[must_use]
    pub fn variables(&self, page_by: u32) -> PaginationVariables {
        PaginationVariables::from_query(
            self.cursor.as_deref(),
            self.direction.as_deref(),
            page_by,
        )
    }
}

/// Product listing page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub products: Vec<ProductCardView>,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

/// Product detail page template.
#[derive(Template)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductView,
    pub price: Option<PriceView>,
    pub options: Vec<VariantOption>,
    pub add_to_cart: AddToCartView,
    pub technical_details: Vec<TechnicalDetail>,
    pub upsells: Vec<UpsellView>,
}

/// Option pickers, re-rendered once every variant is known.
#[derive(Template)]
#[template(path = "partials/variant_options.html")]
pub struct VariantOptionsTemplate {
    pub options: Vec<VariantOption>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display product listing page.
#[instrument(skip(state, ctx, query))]
pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<PaginationQuery>,
) -> Result<Response> {
    let (root, products) = futures::try_join!(RootData::load(&state, &ctx), async {
        state
            .storefront()
            .get_products(query.variables(PRODUCTS_PER_PAGE))
            .await
            .map_err(AppError::from)
    })?;

    let html = ProductsIndexTemplate {
        layout: root.layout(&ctx, "Produkter"),
        heading: ctx.site.products_heading,
        products: products.nodes.iter().map(ProductCardView::from).collect(),
        previous_href: products.page_info.previous_href(PRODUCTS_PATH),
        next_href: products.page_info.next_href(PRODUCTS_PATH),
    }
    .render()?;

    Ok(root.stream(&ctx, html).into_response())
}

/// Display product detail page.
///
/// Query parameters select the variant (`?Storlek=M`). When no variant
/// matches, the visitor is redirected to the first variant's URL.
#[instrument(skip(state, ctx, query), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(handle): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let search_params = parse_query(query.as_deref());
    let selection = selected_options_from_query(&search_params);
    let client = state.storefront();

    let (root, product) = futures::try_join!(RootData::load(&state, &ctx), async {
        client.get_product(&handle, &selection).await.map_err(AppError::from)
    })?;

    let selected_variant = match resolve_variant(
        PRODUCTS_PATH,
        &product.handle,
        product.selected_variant.as_ref(),
        &product.variants,
        &selection,
        &search_params,
    ) {
        VariantResolution::Selected(variant) => Some(variant.clone()),
        VariantResolution::NoVariants => None,
        VariantResolution::Redirect(location) => {
            tracing::debug!(location = %location, "Redirecting to first variant");
            return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
        }
    };

    // Every variant, for option availability; the page renders without it
    let variants = {
        let client = client.clone();
        let handle = product.handle.clone();
        Deferred::spawn(async move { client.get_product_variants(&handle).await })
    };

    let technical_details_id = product.technical_details_id();
    let upsell_ids = product.cart_upsell_ids();
    let (technical, upsell_objects, upsell_candidates) = futures::try_join!(
        async {
            match &technical_details_id {
                Some(id) => client.get_metaobject(id).await,
                None => Ok(None),
            }
        },
        try_join_all(upsell_ids.iter().map(|id| client.get_metaobject(id))),
        async {
            if upsell_ids.is_empty() {
                Ok(Vec::new())
            } else {
                client.get_upsell_products(UPSELL_PRODUCT_COUNT).await
            }
        },
    )?;

    let upsell_objects: Vec<_> = upsell_objects.into_iter().flatten().collect();
    let upsells = product_upsells(&upsell_objects, &upsell_candidates);

    let html = ProductShowTemplate {
        layout: root.layout(&ctx, &product.title),
        product: ProductView {
            handle: product.handle.clone(),
            title: product.title.clone(),
            description_html: product.description_html.clone(),
            images: product
                .images
                .iter()
                .map(|image| ImageView::new(image, &product.title))
                .collect(),
        },
        price: selected_variant
            .as_ref()
            .map(|variant| PriceView::new(&variant.price, variant.compare_at_price.as_ref())),
        options: variant_options::<ProductVariant>(
            PRODUCTS_PATH,
            &product.handle,
            &product.options,
            &[],
            selected_variant.as_ref(),
            &search_params,
        ),
        add_to_cart: AddToCartView::new(
            selected_variant.as_ref().map(|variant| &variant.id),
            selected_variant
                .as_ref()
                .is_some_and(|variant| variant.available_for_sale),
            true,
        ),
        technical_details: technical
            .as_ref()
            .map(technical_details)
            .unwrap_or_default(),
        upsells: upsells.iter().map(UpsellView::from).collect(),
    }
    .render()?;

    let pickers = OptionPickers {
        handle: product.handle,
        options: product.options,
        selected_variant,
        search_params,
    };

    Ok(root
        .stream(&ctx, html)
        .section(
            "variant-options",
            variants,
            move |variants| pickers.render(&variants),
            "Det uppstod ett problem vid inläsning av produktvarianter",
        )
        .into_response())
}

/// What the option pickers need once the variant list arrives.
struct OptionPickers {
    handle: String,
    options: Vec<ProductOption>,
    selected_variant: Option<ProductVariant>,
    search_params: Vec<(String, String)>,
}

impl OptionPickers {
    fn render(&self, variants: &[ProductVariant]) -> askama::Result<String> {
        VariantOptionsTemplate {
            options: variant_options(
                PRODUCTS_PATH,
                &self.handle,
                &self.options,
                variants,
                self.selected_variant.as_ref(),
                &self.search_params,
            ),
        }
        .render()
    }
}

/// Decode a raw query string into ordered name/value pairs.
#[must_use]
pub fn parse_query(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn sek(amount: i64) -> Money {
        Money::new(Decimal::new(amount, 0), "SEK")
    }

    #[test]
    fn test_parse_query_keeps_order_and_decodes() {
        let params = parse_query(Some("Storlek=M&F%C3%A4rg=Bl%C3%A5&utm_source=x"));
        assert_eq!(
            params,
            vec![
                ("Storlek".to_string(), "M".to_string()),
                ("Färg".to_string(), "Blå".to_string()),
                ("utm_source".to_string(), "x".to_string()),
            ]
        );
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_add_to_cart_form() {
        let id = VariantId::from("gid://shopify/ProductVariant/1");
        let form = AddToCartView::new(Some(&id), true, true);
        assert_eq!(form.label, "Lägg i varukorgen");
        assert!(!form.disabled);

        let input: serde_json::Value = serde_json::from_str(&form.form_input).unwrap();
        assert_eq!(input["action"], "LinesAdd");
        assert_eq!(
            input["inputs"]["lines"][0]["merchandiseId"],
            "gid://shopify/ProductVariant/1"
        );
        assert_eq!(input["inputs"]["lines"][0]["quantity"], 1);
    }

    #[test]
    fn test_sold_out_form_is_disabled() {
        let id = VariantId::from("gid://shopify/ProductVariant/1");
        let form = AddToCartView::new(Some(&id), false, true);
        assert_eq!(form.label, "Slutsåld");
        assert!(form.disabled);
        assert!(AddToCartView::new(None, true, true).disabled);
    }

    #[test]
    fn test_price_view_discount() {
        let price = PriceView::new(&sek(1299), Some(&sek(1499)));
        assert_eq!(price.price, "1299 kr");
        assert_eq!(price.compare_at.as_deref(), Some("1499 kr"));

        let price = PriceView::new(&sek(1299), Some(&sek(0)));
        assert!(price.compare_at.is_none());
    }

    #[test]
    fn test_pagination_query_previous() {
        let query = PaginationQuery {
            cursor: Some("abc".to_string()),
            direction: Some("previous".to_string()),
        };
        let variables = query.variables(8);
        assert_eq!(variables.last, Some(8));
        assert_eq!(variables.start_cursor.as_deref(), Some("abc"));
        assert!(variables.first.is_none());
    }
}
