//! Domain types for Shopify Storefront API data.
//!
//! These types mirror the fields the storefront queries. They deserialize
//! from Shopify's camelCase JSON and serialize back in the same shape, which
//! is what the cart endpoint returns to scripts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stallmagneten_core::variant::VariantLike;

pub use stallmagneten_core::{
    CartId, CartLineId, MetaobjectId, Money, PageInfo, ProductId, ProductOption, SelectedOption,
    VariantId,
};

// =============================================================================
// Common Types
// =============================================================================

/// Product or article image hosted on the Shopify CDN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl Image {
    /// Alt text, falling back to the given title.
    #[must_use]
    pub fn alt_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.alt_text
            .as_deref()
            .filter(|alt| !alt.is_empty())
            .unwrap_or(fallback)
    }
}

/// A `nodes` list from a GraphQL connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// A paginated `nodes` list with cursor info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedConnection<T> {
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

// =============================================================================
// Product Types
// =============================================================================

/// Parent product snapshot on a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantProduct {
    pub title: String,
    pub handle: String,
}

/// A purchasable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    pub title: String,
    pub available_for_sale: bool,
    pub selected_options: Vec<SelectedOption>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub image: Option<Image>,
    pub sku: Option<String>,
    pub product: Option<VariantProduct>,
}

impl VariantLike for ProductVariant {
    fn selected_options(&self) -> &[SelectedOption] {
        &self.selected_options
    }

    fn available_for_sale(&self) -> bool {
        self.available_for_sale
    }
}

/// A `key`/`value` metafield on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    pub key: String,
    pub value: String,
}

/// A product with its options, first variant and selected variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    pub vendor: String,
    pub description: String,
    pub description_html: String,
    pub images: Vec<Image>,
    pub options: Vec<ProductOption>,
    pub metafields: Vec<Metafield>,
    /// Variant resolved by Shopify from the requested options, if any
    pub selected_variant: Option<ProductVariant>,
    /// The first variant(s); the full list is queried separately
    pub variants: Vec<ProductVariant>,
}

impl Product {
    fn metafield(&self, key: &str) -> Option<&str> {
        self.metafields
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.value.as_str())
    }

    /// Metaobject ID holding this product's technical details.
    #[must_use]
    pub fn technical_details_id(&self) -> Option<MetaobjectId> {
        self.metafield("technical_details")
            .filter(|id| !id.is_empty())
            .map(MetaobjectId::from)
    }

    /// Metaobject IDs listed in the `cart_upsells` metafield.
    ///
    /// The metafield holds a JSON list of IDs (`["gid://…","gid://…"]`).
    #[must_use]
    pub fn cart_upsell_ids(&self) -> Vec<MetaobjectId> {
        let Some(raw) = self.metafield("cart_upsells") else {
            return Vec::new();
        };

        serde_json::from_str::<Vec<String>>(raw)
            .unwrap_or_else(|_| {
                raw.trim_matches(|c| c == '[' || c == ']')
                    .split(',')
                    .map(|id| id.trim().trim_matches('"').to_string())
                    .collect()
            })
            .into_iter()
            .filter(|id| !id.is_empty())
            .map(MetaobjectId::from)
            .collect()
    }
}

/// Min/max variant prices of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_variant_price: Money,
    pub max_variant_price: Option<Money>,
}

/// Variant reference used by product cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub id: VariantId,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

/// Product card data for grids, recommendations and upsells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    #[serde(default = "default_true")]
    pub available_for_sale: bool,
    pub featured_image: Option<Image>,
    pub price_range: PriceRange,
    #[serde(default)]
    pub variants: Connection<VariantSummary>,
}

const fn default_true() -> bool {
    true
}

impl ProductSummary {
    /// The first variant, used for quick add-to-cart buttons.
    #[must_use]
    pub fn first_variant(&self) -> Option<&VariantSummary> {
        self.variants.nodes.first()
    }
}

/// A collection shown on the homepage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub image: Option<Image>,
}

// =============================================================================
// Metaobjects
// =============================================================================

/// A single metaobject field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaobjectField {
    pub key: String,
    pub value: Option<String>,
}

/// A generic structured content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metaobject {
    pub id: MetaobjectId,
    pub fields: Vec<MetaobjectField>,
}

impl Metaobject {
    /// Value of the field with the given key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .and_then(|f| f.value.as_deref())
    }
}

/// A labelled row in a product's technical details table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalDetail {
    pub label: &'static str,
    pub value: String,
}

/// Display label for a technical details field key.
#[must_use]
pub fn technical_detail_label(key: &str) -> &'static str {
    match key {
        "bredd_mellan_hjulen" => "Bredd mellan hjulen",
        "hjul_i_diameter" => "Hjul i diameter",
        "material" => "Material",
        "teleskopskaft" => "Teleskopskaft",
        _ => "Detalj",
    }
}

/// Turn a technical details metaobject into labelled rows.
///
/// Fields without a value are skipped.
#[must_use]
pub fn technical_details(metaobject: &Metaobject) -> Vec<TechnicalDetail> {
    metaobject
        .fields
        .iter()
        .filter_map(|field| {
            field.value.as_ref().map(|value| TechnicalDetail {
                label: technical_detail_label(&field.key),
                value: value.clone(),
            })
        })
        .collect()
}

/// A product recommended alongside another, with a pitch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upsell {
    pub product: ProductSummary,
    pub description: Option<String>,
}

/// Upsells configured on a product page.
///
/// Keeps the order of `products`; only products referenced by a metaobject's
/// `product` field are included.
#[must_use]
pub fn product_upsells(metaobjects: &[Metaobject], products: &[ProductSummary]) -> Vec<Upsell> {
    products
        .iter()
        .filter_map(|product| {
            metaobjects
                .iter()
                .find(|m| m.field("product") == Some(product.id.as_str()))
                .map(|m| Upsell {
                    product: product.clone(),
                    description: m.field("description").map(ToString::to_string),
                })
        })
        .collect()
}

/// Upsells to show in the cart.
///
/// A `cart_upsell` metaobject applies when some line holds its
/// `self_product` and no line already holds its `product`.
#[must_use]
pub fn cart_upsells(
    options: &[Metaobject],
    products: &[ProductSummary],
    cart: Option<&Cart>,
) -> Vec<Upsell> {
    let Some(cart) = cart else {
        return Vec::new();
    };

    let in_cart = |id: Option<&str>| {
        cart.lines
            .iter()
            .any(|line| Some(line.merchandise.product.id.as_str()) == id)
    };

    options
        .iter()
        .filter(|option| in_cart(option.field("self_product")) && !in_cart(option.field("product")))
        .filter_map(|option| {
            let product_id = option.field("product")?;
            products
                .iter()
                .find(|p| p.id.as_str() == product_id)
                .map(|product| Upsell {
                    product: product.clone(),
                    description: option.field("description").map(ToString::to_string),
                })
        })
        .collect()
}

// =============================================================================
// Navigation
// =============================================================================

/// A navigation menu item, possibly with children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl MenuItem {
    /// Link target, relative when the URL points at one of the shop's domains.
    #[must_use]
    pub fn href(&self, own_domains: &[&str]) -> String {
        let Some(url) = self.url.as_deref() else {
            return "/".to_string();
        };

        let is_own = url.contains("myshopify.com")
            || own_domains
                .iter()
                .filter(|d| !d.is_empty())
                .any(|d| url.contains(d));

        if is_own {
            url::Url::parse(url).map_or_else(|_| url.to_string(), |u| u.path().to_string())
        } else {
            url.to_string()
        }
    }
}

/// A navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub items: Vec<MenuItem>,
}

/// A resolved menu link ready for templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuLink {
    pub title: String,
    pub href: String,
}

impl Menu {
    /// Top-level links with own-domain URLs made relative.
    ///
    /// Items whose URL contains any of `hidden` are dropped.
    #[must_use]
    pub fn links(&self, own_domains: &[&str], hidden: &[&str]) -> Vec<MenuLink> {
        self.items
            .iter()
            .filter(|item| {
                item.url
                    .as_deref()
                    .is_none_or(|url| !hidden.iter().any(|h| url.contains(h)))
            })
            .map(|item| MenuLink {
                title: item.title.clone(),
                href: item.href(own_domains),
            })
            .collect()
    }
}

/// Shop primary domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub url: String,
}

/// Shop-level data for the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub primary_domain: Domain,
}

impl Shop {
    /// Host of the primary domain (e.g., `stallmagneten.se`).
    #[must_use]
    pub fn primary_host(&self) -> Option<String> {
        url::Url::parse(&self.primary_domain.url)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string))
    }
}

/// Header data: shop info and the main menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub shop: Shop,
    pub menu: Option<Menu>,
}

/// Footer data: the footer menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    pub menu: Option<Menu>,
}

// =============================================================================
// Content Types
// =============================================================================

/// Article author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleAuthor {
    pub name: String,
}

/// A blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub content_html: String,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "authorV2")]
    pub author: Option<ArticleAuthor>,
    pub image: Option<Image>,
}

/// One page of a blog's articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogArticles {
    pub title: String,
    pub articles: Vec<Article>,
    pub page_info: PageInfo,
}

/// A CMS page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub body: String,
}

/// A shop policy (privacy, shipping, terms, refund).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub body: String,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Parent product of a cart line's merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandiseProduct {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
}

/// The variant held by a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandise {
    pub id: VariantId,
    pub title: String,
    pub image: Option<Image>,
    pub selected_options: Vec<SelectedOption>,
    pub product: CartMerchandiseProduct,
}

/// Per-unit and total cost of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCost {
    pub amount_per_quantity: Money,
    pub total_amount: Money,
    pub compare_at_amount_per_quantity: Option<Money>,
}

/// A cart line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartLineId,
    pub quantity: i64,
    pub cost: CartLineCost,
    pub merchandise: CartMerchandise,
}

/// Cart totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    pub subtotal_amount: Money,
    pub total_amount: Money,
}

/// A discount code applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartDiscountCode {
    pub code: String,
    pub applicable: bool,
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub checkout_url: String,
    pub total_quantity: i64,
    pub cost: CartCost,
    pub lines: Vec<CartLine>,
    pub discount_codes: Vec<CartDiscountCode>,
}

impl Cart {
    /// Codes currently applied to the cart, in order.
    #[must_use]
    pub fn discount_code_list(&self) -> Vec<String> {
        self.discount_codes.iter().map(|d| d.code.clone()).collect()
    }

    /// Only the codes Shopify reports as applicable.
    #[must_use]
    pub fn applicable_discount_codes(&self) -> Vec<&CartDiscountCode> {
        self.discount_codes.iter().filter(|d| d.applicable).collect()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A user error returned by a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUserError {
    pub code: Option<String>,
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl CartUserError {
    /// A locally produced error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            field: None,
            message: message.into(),
        }
    }
}

/// Result of a cart query or mutation.
///
/// User errors are carried alongside the (possibly unchanged) cart rather
/// than turned into `Err`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartQueryData {
    pub cart: Option<Cart>,
    pub errors: Vec<CartUserError>,
}

// =============================================================================
// Cart Inputs
// =============================================================================

/// A custom key/value on a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInput {
    pub key: String,
    pub value: String,
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: VariantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_plan_id: Option<String>,
}

/// Input for updating an existing cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    pub id: CartLineId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchandise_id: Option<VariantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeInput>>,
}

/// Input for updating who is buying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartBuyerIdentityInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_access_token: Option<String>,
}

/// Input for creating a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartInput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<CartLineInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discount_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_identity: Option<CartBuyerIdentityInput>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn summary(id: &str) -> ProductSummary {
        serde_json::from_value(json!({
            "id": id,
            "handle": id.rsplit('/').next().unwrap(),
            "title": "Magnet",
            "featuredImage": null,
            "priceRange": { "minVariantPrice": { "amount": "499.0", "currencyCode": "SEK" } },
            "variants": { "nodes": [{ "id": format!("{id}/variant") }] }
        }))
        .unwrap()
    }

    fn metaobject(id: &str, fields: &[(&str, &str)]) -> Metaobject {
        Metaobject {
            id: MetaobjectId::from(id),
            fields: fields
                .iter()
                .map(|(k, v)| MetaobjectField {
                    key: (*k).to_string(),
                    value: Some((*v).to_string()),
                })
                .collect(),
        }
    }

    fn cart_with_products(product_ids: &[&str]) -> Cart {
        let lines = product_ids
            .iter()
            .enumerate()
            .map(|(i, pid)| CartLine {
                id: CartLineId::new(format!("gid://shopify/CartLine/{i}")),
                quantity: 1,
                cost: CartLineCost {
                    amount_per_quantity: Money::new(rust_decimal::Decimal::ONE, "SEK"),
                    total_amount: Money::new(rust_decimal::Decimal::ONE, "SEK"),
                    compare_at_amount_per_quantity: None,
                },
                merchandise: CartMerchandise {
                    id: VariantId::new(format!("{pid}/variant")),
                    title: "Default Title".to_string(),
                    image: None,
                    selected_options: vec![],
                    product: CartMerchandiseProduct {
                        id: ProductId::from(*pid),
                        handle: "magnet".to_string(),
                        title: "Magnet".to_string(),
                    },
                },
            })
            .collect();

        Cart {
            id: CartId::from("gid://shopify/Cart/1"),
            checkout_url: "https://checkout".to_string(),
            total_quantity: 1,
            cost: CartCost {
                subtotal_amount: Money::new(rust_decimal::Decimal::ONE, "SEK"),
                total_amount: Money::new(rust_decimal::Decimal::ONE, "SEK"),
            },
            lines,
            discount_codes: vec![],
        }
    }

    #[test]
    fn test_technical_detail_labels() {
        assert_eq!(technical_detail_label("bredd_mellan_hjulen"), "Bredd mellan hjulen");
        assert_eq!(technical_detail_label("hjul_i_diameter"), "Hjul i diameter");
        assert_eq!(technical_detail_label("material"), "Material");
        assert_eq!(technical_detail_label("teleskopskaft"), "Teleskopskaft");
        assert_eq!(technical_detail_label("vikt"), "Detalj");
    }

    #[test]
    fn test_technical_details_skip_empty_values() {
        let mut details = metaobject("gid://shopify/Metaobject/1", &[("material", "Stål")]);
        details.fields.push(MetaobjectField {
            key: "vikt".to_string(),
            value: None,
        });
        let rows = technical_details(&details);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Material");
        assert_eq!(rows[0].value, "Stål");
    }

    #[test]
    fn test_cart_upsell_ids_parses_json_list() {
        let product = Product {
            id: ProductId::from("gid://shopify/Product/1"),
            handle: "magnet".to_string(),
            title: "Magnet".to_string(),
            vendor: String::new(),
            description: String::new(),
            description_html: String::new(),
            images: vec![],
            options: vec![],
            metafields: vec![Metafield {
                key: "cart_upsells".to_string(),
                value: r#"["gid://shopify/Metaobject/1","gid://shopify/Metaobject/2"]"#
                    .to_string(),
            }],
            selected_variant: None,
            variants: vec![],
        };
        let ids = product.cart_upsell_ids();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1].as_str(), "gid://shopify/Metaobject/2");
        assert!(product.technical_details_id().is_none());
    }

    #[test]
    fn test_product_upsells_keep_only_referenced_products() {
        let products = vec![
            summary("gid://shopify/Product/1"),
            summary("gid://shopify/Product/2"),
        ];
        let upsells = product_upsells(
            &[metaobject(
                "gid://shopify/Metaobject/9",
                &[("product", "gid://shopify/Product/2"), ("description", "Passar bra")],
            )],
            &products,
        );
        assert_eq!(upsells.len(), 1);
        assert_eq!(upsells[0].product.id.as_str(), "gid://shopify/Product/2");
        assert_eq!(upsells[0].description.as_deref(), Some("Passar bra"));
    }

    #[test]
    fn test_cart_upsells_require_self_product_and_skip_owned() {
        let products = vec![summary("gid://shopify/Product/2")];
        let options = vec![metaobject(
            "gid://shopify/Metaobject/9",
            &[
                ("self_product", "gid://shopify/Product/1"),
                ("product", "gid://shopify/Product/2"),
            ],
        )];

        let cart = cart_with_products(&["gid://shopify/Product/1"]);
        assert_eq!(cart_upsells(&options, &products, Some(&cart)).len(), 1);

        let cart = cart_with_products(&["gid://shopify/Product/1", "gid://shopify/Product/2"]);
        assert!(cart_upsells(&options, &products, Some(&cart)).is_empty());

        let cart = cart_with_products(&["gid://shopify/Product/3"]);
        assert!(cart_upsells(&options, &products, Some(&cart)).is_empty());

        assert!(cart_upsells(&options, &products, None).is_empty());
    }

    #[test]
    fn test_menu_links_relative_and_hidden() {
        let menu: Menu = serde_json::from_value(json!({
            "id": "gid://shopify/Menu/1",
            "items": [
                { "id": "1", "title": "Produkter", "url": "https://stallmagneten.myshopify.com/produkter" },
                { "id": "2", "title": "Om oss", "url": "https://stallmagneten.se/om-oss" },
                { "id": "3", "title": "Blogg", "url": "https://stallmagneten.se/blogg" },
                { "id": "4", "title": "Instagram", "url": "https://instagram.com/stallmagneten" }
            ]
        }))
        .unwrap();

        let links = menu.links(&["stallmagneten.se"], &["blogg", "hastprodukter"]);
        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["/produkter", "/om-oss", "https://instagram.com/stallmagneten"]
        );
    }

    #[test]
    fn test_cart_line_input_from_form_json() {
        let input: CartLineInput = serde_json::from_value(json!({
            "merchandiseId": "gid://shopify/ProductVariant/1",
            "quantity": 2
        }))
        .unwrap();
        assert_eq!(input.quantity, Some(2));
        let out = serde_json::to_value(&input).unwrap();
        assert_eq!(
            out,
            json!({ "merchandiseId": "gid://shopify/ProductVariant/1", "quantity": 2 })
        );
    }
}
