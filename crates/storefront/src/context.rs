//! Request-scoped data shared by every page.
//!
//! [`RequestContext`] is extracted per request and carries what the
//! session knows about the visitor. [`RootData`] is loaded once per page:
//! the header is awaited because every page renders it above the fold,
//! while the cart, footer and upsell data are spawned as [`Deferred`]
//! values and streamed in later.

use askama::Template;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::SiteConfig;
use crate::deferred::{Deferred, StreamingPage};
use crate::error::AppError;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{CustomerAccessToken, session_keys};
use crate::shopify::types::{Cart, CartId, Footer, Header, MenuLink, Metaobject, ProductSummary};
use crate::state::AppState;

/// Header menu links that are never shown.
const HIDDEN_HEADER_LINKS: &[&str] = &["blogg", "hastprodukter"];

/// Metaobject type configuring cart upsells.
pub const CART_UPSELL_TYPE: &str = "cart_upsell";

/// Number of products fetched as upsell candidates.
pub const UPSELL_PRODUCT_COUNT: u32 = 10;

// =============================================================================
// RequestContext
// =============================================================================

/// What the storefront knows about the current visitor.
#[derive(Clone)]
pub struct RequestContext {
    pub session: Session,
    pub nonce: String,
    pub site: &'static SiteConfig,
    pub is_logged_in: bool,
    pub cart_id: Option<CartId>,
    pub customer_access_token: Option<String>,
    pub path: String,
}

impl RequestContext {
    /// Remember `cart_id` as the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn set_cart_id(&self, cart_id: &CartId) -> Result<(), AppError> {
        self.session.insert(session_keys::CART_ID, cart_id).await?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;
        let CspNonce(nonce) = parts.extensions.get::<CspNonce>().cloned().unwrap_or_else(|| {
            tracing::warn!("CSP nonce not found in request extensions");
            CspNonce(String::new())
        });

        let customer_access_token = current_customer_token(&session).await?;
        let cart_id = session.get::<CartId>(session_keys::CART_ID).await?;

        Ok(Self {
            session,
            nonce,
            site: state.config().site_config(),
            is_logged_in: customer_access_token.is_some(),
            cart_id,
            customer_access_token,
            path: parts.uri.path().to_string(),
        })
    }
}

/// The session's customer access token, if still valid.
///
/// Expired tokens are removed from the session.
async fn current_customer_token(session: &Session) -> Result<Option<String>, AppError> {
    let Some(token) = session
        .get::<CustomerAccessToken>(session_keys::CUSTOMER_ACCESS_TOKEN)
        .await?
    else {
        return Ok(None);
    };

    if token.is_expired_at(chrono::Utc::now()) {
        tracing::debug!("Removing expired customer access token");
        session
            .remove::<CustomerAccessToken>(session_keys::CUSTOMER_ACCESS_TOKEN)
            .await?;
        return Ok(None);
    }

    Ok(Some(token.access_token))
}

// =============================================================================
// Layout
// =============================================================================

/// Data rendered by `base.html` around every page.
#[derive(Clone)]
pub struct Layout {
    pub site: &'static SiteConfig,
    pub title: String,
    pub nonce: String,
    pub shop_name: String,
    pub menu: Vec<MenuLink>,
    pub path: String,
    pub is_logged_in: bool,
}

impl Layout {
    /// Whether `href` is the current page.
    #[must_use]
    pub fn is_active(&self, href: &str) -> bool {
        self.path == href
    }

    /// Whether the current page is the home page.
    #[must_use]
    pub fn is_home(&self) -> bool {
        self.path == "/"
    }
}

#[derive(Template)]
#[template(path = "partials/cart_count.html")]
struct CartCountTemplate {
    count: i64,
}

#[derive(Template)]
#[template(path = "partials/footer.html")]
struct FooterTemplate {
    links: Vec<MenuLink>,
    site: &'static SiteConfig,
}

// =============================================================================
// RootData
// =============================================================================

/// Data every page needs, loaded before the page's own data.
#[derive(Clone)]
pub struct RootData {
    pub header: Header,
    pub cart: Deferred<Option<Cart>>,
    pub footer: Deferred<Footer>,
    pub cart_upsell_options: Deferred<Vec<Metaobject>>,
    pub upsell_products: Deferred<Vec<ProductSummary>>,
    own_domains: Vec<String>,
}

impl RootData {
    /// Await the header; spawn the cart, footer and upsell queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the header query fails.
    #[instrument(skip(state, ctx), fields(cart = ctx.cart_id.is_some()))]
    pub async fn load(state: &AppState, ctx: &RequestContext) -> Result<Self, AppError> {
        let client = state.storefront();
        let config = state.config();

        let cart = match ctx.cart_id.clone() {
            Some(cart_id) => {
                let client = client.clone();
                Deferred::spawn(async move { client.get_cart(&cart_id).await })
            }
            None => Deferred::ready(None),
        };

        let footer = {
            let client = client.clone();
            let menu = config.footer_menu.clone();
            Deferred::spawn(async move { client.get_footer(&menu).await })
        };

        let cart_upsell_options = {
            let client = client.clone();
            Deferred::spawn(async move { client.get_metaobjects(CART_UPSELL_TYPE).await })
        };

        let upsell_products = {
            let client = client.clone();
            Deferred::spawn(async move { client.get_upsell_products(UPSELL_PRODUCT_COUNT).await })
        };

        let header = client.get_header(&config.header_menu).await?;

        let mut own_domains = vec![config.shopify.store.clone()];
        own_domains.extend(header.shop.primary_host());

        Ok(Self {
            header,
            cart,
            footer,
            cart_upsell_options,
            upsell_products,
            own_domains,
        })
    }

    fn own_domains(&self) -> Vec<&str> {
        self.own_domains.iter().map(String::as_str).collect()
    }

    /// Layout data for a page titled `"{brand} | {page_title}"`.
    #[must_use]
    pub fn layout(&self, ctx: &RequestContext, page_title: &str) -> Layout {
        let menu = self
            .header
            .menu
            .as_ref()
            .map(|menu| menu.links(&self.own_domains(), HIDDEN_HEADER_LINKS))
            .unwrap_or_default();

        Layout {
            site: ctx.site,
            title: ctx.site.title(page_title),
            nonce: ctx.nonce.clone(),
            shop_name: self.header.shop.name.clone(),
            menu,
            path: ctx.path.clone(),
            is_logged_in: ctx.is_logged_in,
        }
    }

    /// Stream a rendered page, filling in the cart badge and footer.
    #[must_use]
    pub fn stream(&self, ctx: &RequestContext, html: String) -> StreamingPage {
        let own_domains = self.own_domains.clone();
        let site = ctx.site;

        StreamingPage::new(html, ctx.nonce.clone())
            .section(
                "cart-count",
                self.cart.clone(),
                |cart| {
                    CartCountTemplate {
                        count: cart.map_or(0, |cart| cart.total_quantity),
                    }
                    .render()
                },
                "0",
            )
            .section(
                "footer",
                self.footer.clone(),
                move |footer| {
                    let domains: Vec<&str> = own_domains.iter().map(String::as_str).collect();
                    FooterTemplate {
                        links: footer
                            .menu
                            .map(|menu| menu.links(&domains, &[]))
                            .unwrap_or_default(),
                        site,
                    }
                    .render()
                },
                "",
            )
    }
}
