//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` envelopes with `reqwest` 0.13 for HTTP.
//! Caches menus and policies using `moka` (1-hour TTL).

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use secrecy::ExposeSecret;
use stallmagneten_core::PaginationVariables;
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Article, BlogArticles, Cart, CartBuyerIdentityInput, CartId, CartInput, CartLineId,
    CartLineInput, CartLineUpdateInput, CartQueryData, Collection, Footer, Header, Metaobject,
    MetaobjectId, Page, PaginatedConnection, Policy, Product, ProductSummary, ProductVariant,
    SelectedOption,
};

use cache::{CacheKey, CacheValue};
use conversions::{convert_cart, convert_cart_payload, convert_product};
use queries::{
    Articles, CartBuyerIdentityUpdate, CartCreate, CartDiscountCodesUpdate, CartLinesAdd,
    CartLinesRemove, CartLinesUpdate, CartQuery, FeaturedCollection, MetaObject, MetaObjects,
    Policies, ProductVariants, Products, RecommendedProducts, UpsellProducts, article, articles,
    cart_buyer_identity_update, cart_create, cart_discount_codes_update, cart_lines_add,
    cart_lines_remove, cart_lines_update, cart_query, featured_collection, footer, header,
    meta_object, meta_objects, page, policies, product, product_variants, recommended_products,
    upsell_products,
};

/// Menus and policies change rarely; one hour matches Hydrogen's `CacheLong`.
const LAYOUT_CACHE_TTL: Duration = Duration::from_secs(3600);

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides typed access to products, content, and cart operations.
/// Menus and policies are cached for an hour; nothing else is cached.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(LAYOUT_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.graphql_endpoint(),
                access_token: config.storefront_private_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                &self.inner.access_token,
            )
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                operation = request_body.operation_name,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![super::GraphQLError {
                message: format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
                locations: vec![],
                path: vec![],
            }]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    operation = request_body.operation_name,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");

            return Err(ShopifyError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| super::GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| super::GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                operation = request_body.operation_name,
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![super::GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    // =========================================================================
    // Layout Methods (cached)
    // =========================================================================

    /// Get the shop info and header menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_header(&self, menu_handle: &str) -> Result<Header, ShopifyError> {
        let cache_key = CacheKey::Header(menu_handle.to_string());
        if let Some(CacheValue::Header(header)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for header");
            return Ok(*header);
        }

        let data = self
            .execute::<queries::Header>(header::Variables {
                header_menu_handle: menu_handle.to_string(),
            })
            .await?;

        let header = Header {
            shop: data.shop,
            menu: data.menu,
        };
        self.inner
            .cache
            .insert(cache_key, CacheValue::Header(Box::new(header.clone())))
            .await;

        Ok(header)
    }

    /// Get the footer menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_footer(&self, menu_handle: &str) -> Result<Footer, ShopifyError> {
        let cache_key = CacheKey::Footer(menu_handle.to_string());
        if let Some(CacheValue::Footer(footer)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for footer");
            return Ok(*footer);
        }

        let data = self
            .execute::<queries::Footer>(footer::Variables {
                footer_menu_handle: menu_handle.to_string(),
            })
            .await?;

        let footer = Footer { menu: data.menu };
        self.inner
            .cache
            .insert(cache_key, CacheValue::Footer(Box::new(footer.clone())))
            .await;

        Ok(footer)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by handle, resolving the variant for `selected_options`.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no product has this handle, or an
    /// error if the API request fails.
    #[instrument(skip(self, selected_options), fields(handle = %handle))]
    pub async fn get_product(
        &self,
        handle: &str,
        selected_options: &[SelectedOption],
    ) -> Result<Product, ShopifyError> {
        let data = self
            .execute::<queries::Product>(product::Variables {
                handle: handle.to_string(),
                selected_options: selected_options.to_vec(),
            })
            .await?;

        data.product
            .map(convert_product)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))
    }

    /// Get every variant of a product (up to 250).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_variants(
        &self,
        handle: &str,
    ) -> Result<Vec<ProductVariant>, ShopifyError> {
        let data = self
            .execute::<ProductVariants>(product_variants::Variables {
                handle: handle.to_string(),
            })
            .await?;

        Ok(data
            .product
            .map(|p| p.variants.nodes)
            .unwrap_or_default())
    }

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        pagination: PaginationVariables,
    ) -> Result<PaginatedConnection<ProductSummary>, ShopifyError> {
        let data = self.execute::<Products>(pagination).await?;
        Ok(data.products)
    }

    /// Get the products upsells are picked from.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_upsell_products(
        &self,
        first: u32,
    ) -> Result<Vec<ProductSummary>, ShopifyError> {
        let data = self
            .execute::<UpsellProducts>(upsell_products::Variables { first })
            .await?;
        Ok(data.products.nodes)
    }

    /// Get the four most recently updated products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_recommended_products(&self) -> Result<Vec<ProductSummary>, ShopifyError> {
        let data = self
            .execute::<RecommendedProducts>(recommended_products::Variables {})
            .await?;
        Ok(data.products.nodes)
    }

    /// Get the most recently updated collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_featured_collection(&self) -> Result<Option<Collection>, ShopifyError> {
        let data = self
            .execute::<FeaturedCollection>(featured_collection::Variables {})
            .await?;
        Ok(data.collections.nodes.into_iter().next())
    }

    // =========================================================================
    // Metaobject Methods
    // =========================================================================

    /// Get a metaobject by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_metaobject(
        &self,
        id: &MetaobjectId,
    ) -> Result<Option<Metaobject>, ShopifyError> {
        let data = self
            .execute::<MetaObject>(meta_object::Variables { id: id.clone() })
            .await?;
        Ok(data.metaobject)
    }

    /// Get the first ten metaobjects of a type.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_metaobjects(&self, kind: &str) -> Result<Vec<Metaobject>, ShopifyError> {
        let data = self
            .execute::<MetaObjects>(meta_objects::Variables {
                kind: kind.to_string(),
            })
            .await?;
        Ok(data.metaobjects.nodes)
    }

    // =========================================================================
    // Content Methods
    // =========================================================================

    /// Get a CMS page by handle.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the page doesn't exist, or an error
    /// if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_page(&self, handle: &str) -> Result<Page, ShopifyError> {
        let data = self
            .execute::<queries::Page>(page::Variables {
                handle: handle.to_string(),
            })
            .await?;

        data.page
            .ok_or_else(|| ShopifyError::NotFound(format!("Page not found: {handle}")))
    }

    /// Get an article from a blog.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the blog or article doesn't exist,
    /// or an error if the API request fails.
    #[instrument(skip(self), fields(blog = %blog_handle, handle = %handle))]
    pub async fn get_article(
        &self,
        blog_handle: &str,
        handle: &str,
    ) -> Result<Article, ShopifyError> {
        let data = self
            .execute::<queries::Article>(article::Variables {
                blog_handle: blog_handle.to_string(),
                article_handle: handle.to_string(),
            })
            .await?;

        data.blog
            .and_then(|b| b.article_by_handle)
            .ok_or_else(|| ShopifyError::NotFound(format!("Article not found: {handle}")))
    }

    /// Get a page of a blog's articles.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the blog doesn't exist, or an error
    /// if the API request fails.
    #[instrument(skip(self), fields(blog = %blog_handle))]
    pub async fn get_articles(
        &self,
        blog_handle: &str,
        pagination: PaginationVariables,
    ) -> Result<BlogArticles, ShopifyError> {
        let data = self
            .execute::<Articles>(articles::Variables {
                blog_handle: blog_handle.to_string(),
                pagination,
            })
            .await?;

        let blog = data
            .blog
            .ok_or_else(|| ShopifyError::NotFound(format!("Blog not found: {blog_handle}")))?;

        Ok(BlogArticles {
            title: blog.title,
            articles: blog.articles.nodes,
            page_info: blog.articles.page_info,
        })
    }

    /// Get all published shop policies.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_policies(&self) -> Result<Vec<Policy>, ShopifyError> {
        if let Some(CacheValue::Policies(policies)) =
            self.inner.cache.get(&CacheKey::Policies).await
        {
            debug!("Cache hit for policies");
            return Ok(policies);
        }

        let data = self.execute::<Policies>(policies::Variables {}).await?;
        let shop = data.shop;
        let policies: Vec<Policy> = [
            shop.privacy_policy,
            shop.shipping_policy,
            shop.terms_of_service,
            shop.refund_policy,
        ]
        .into_iter()
        .flatten()
        .collect();

        self.inner
            .cache
            .insert(CacheKey::Policies, CacheValue::Policies(policies.clone()))
            .await;

        Ok(policies)
    }

    /// Get a single policy by handle.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if no policy has this handle, or an
    /// error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_policy(&self, handle: &str) -> Result<Policy, ShopifyError> {
        self.get_policies()
            .await?
            .into_iter()
            .find(|p| p.handle == handle)
            .ok_or_else(|| ShopifyError::NotFound(format!("Policy not found: {handle}")))
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Get an existing cart.
    ///
    /// Returns `None` when Shopify no longer knows the cart (e.g., after
    /// checkout completed).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        let data = self
            .execute::<CartQuery>(cart_query::Variables {
                cart_id: cart_id.clone(),
            })
            .await?;
        Ok(data.cart.map(convert_cart))
    }

    /// Create a new cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. User errors are returned
    /// in the result.
    #[instrument(skip(self, input))]
    pub async fn cart_create(&self, input: CartInput) -> Result<CartQueryData, ShopifyError> {
        let data = self
            .execute::<CartCreate>(cart_create::Variables { input })
            .await?;
        Ok(convert_cart_payload(data.cart_create))
    }

    /// Add lines to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. User errors are returned
    /// in the result.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn cart_lines_add(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<CartQueryData, ShopifyError> {
        let data = self
            .execute::<CartLinesAdd>(cart_lines_add::Variables {
                cart_id: cart_id.clone(),
                lines,
            })
            .await?;
        Ok(convert_cart_payload(data.cart_lines_add))
    }

    /// Update quantities (or merchandise) of cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. User errors are returned
    /// in the result.
    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    pub async fn cart_lines_update(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<CartQueryData, ShopifyError> {
        let data = self
            .execute::<CartLinesUpdate>(cart_lines_update::Variables {
                cart_id: cart_id.clone(),
                lines,
            })
            .await?;
        Ok(convert_cart_payload(data.cart_lines_update))
    }

    /// Remove lines from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. User errors are returned
    /// in the result.
    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id, lines = line_ids.len()))]
    pub async fn cart_lines_remove(
        &self,
        cart_id: &CartId,
        line_ids: Vec<CartLineId>,
    ) -> Result<CartQueryData, ShopifyError> {
        let data = self
            .execute::<CartLinesRemove>(cart_lines_remove::Variables {
                cart_id: cart_id.clone(),
                line_ids,
            })
            .await?;
        Ok(convert_cart_payload(data.cart_lines_remove))
    }

    /// Replace the discount codes on a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. User errors (such as an
    /// unknown code) are returned in the result.
    #[instrument(skip(self, discount_codes), fields(cart_id = %cart_id))]
    pub async fn cart_discount_codes_update(
        &self,
        cart_id: &CartId,
        discount_codes: Vec<String>,
    ) -> Result<CartQueryData, ShopifyError> {
        let data = self
            .execute::<CartDiscountCodesUpdate>(cart_discount_codes_update::Variables {
                cart_id: cart_id.clone(),
                discount_codes,
            })
            .await?;
        Ok(convert_cart_payload(data.cart_discount_codes_update))
    }

    /// Update the buyer identity on a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. User errors are returned
    /// in the result.
    #[instrument(skip(self, buyer_identity), fields(cart_id = %cart_id))]
    pub async fn cart_buyer_identity_update(
        &self,
        cart_id: &CartId,
        buyer_identity: CartBuyerIdentityInput,
    ) -> Result<CartQueryData, ShopifyError> {
        let data = self
            .execute::<CartBuyerIdentityUpdate>(cart_buyer_identity_update::Variables {
                cart_id: cart_id.clone(),
                buyer_identity,
            })
            .await?;
        Ok(convert_cart_payload(data.cart_buyer_identity_update))
    }
}
