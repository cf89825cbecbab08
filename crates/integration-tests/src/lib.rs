//! HTTP-level test harness for the storefront.
//!
//! [`TestStorefront`] runs the full router (middleware included) against a
//! `wiremock` server standing in for the Shopify Storefront API. Requests
//! go through `tower::ServiceExt::oneshot`; the session cookie is carried
//! between requests so a test can build up a cart step by step.
//!
//! ```rust,ignore
//! let mut store = TestStorefront::start().await;
//! store.mock("CartCreate", json!({ "cartCreate": fixtures::cart_payload(cart) })).await;
//!
//! let response = store.post_form("/varukorg", &[("cartFormInput", &input)]).await;
//! assert_eq!(response.status, StatusCode::OK);
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

pub mod fixtures;

use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use stallmagneten_storefront::config::{ShopifyStorefrontConfig, Site, StorefrontConfig};
use stallmagneten_storefront::content::ContentStore;
use stallmagneten_storefront::state::AppState;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Markdown pages served by the test storefront.
const CONTENT: &[(&str, &str)] = &[(
    "om-oss",
    "---\ntitle: Om oss\ndescription: Hovslageri och magneter\n---\n\nStallmagneten föddes i stallet.\n",
)];

/// Storefront configuration pointing at `endpoint`.
#[must_use]
pub fn test_config(endpoint: String) -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        site: Site::Stallmagneten,
        shopify: ShopifyStorefrontConfig {
            store: "stallmagneten.myshopify.com".to_string(),
            api_version: "2024-01".to_string(),
            storefront_private_token: SecretString::from("shpat_integration_test_token"),
            endpoint: Some(endpoint),
        },
        header_menu: "main-menu".to_string(),
        footer_menu: "footer".to_string(),
        blog_handle: "blogg".to_string(),
        content_dir: PathBuf::from("content"),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

/// The storefront router wired to a mock Storefront API.
pub struct TestStorefront {
    pub shopify: MockServer,
    app: Router,
    cookie: Option<String>,
}

impl TestStorefront {
    /// Start a mock Storefront API serving the layout queries every page
    /// makes (header, footer, upsell data) and build the app against it.
    pub async fn start() -> Self {
        let shopify = MockServer::start().await;

        let content = ContentStore::from_sources(CONTENT.iter().copied())
            .expect("test content is valid");
        let state = AppState::with_content(test_config(shopify.uri()), content);

        let store = Self {
            shopify,
            app: stallmagneten_storefront::app(state),
            cookie: None,
        };

        store.mock("Header", fixtures::header()).await;
        store.mock("Footer", fixtures::footer()).await;
        store
            .mock("MetaObjects", json!({ "metaobjects": { "nodes": [] } }))
            .await;
        store
            .mock("UpsellProducts", json!({ "products": { "nodes": [] } }))
            .await;

        store
    }

    /// Matcher for requests running the named GraphQL operation.
    #[must_use]
    pub fn operation(operation: &str) -> MockBuilder {
        Mock::given(method("POST")).and(body_partial_json(json!({
            "operationName": operation
        })))
    }

    /// Answer every `operation` request with `data`.
    pub async fn mock(&self, operation: &str, data: Value) {
        Self::operation(operation)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
            .mount(&self.shopify)
            .await;
    }

    /// Answer every `operation` request with `data` after `delay`.
    ///
    /// Takes precedence over mocks mounted with [`Self::mock`], including
    /// the layout queries [`Self::start`] mounts.
    pub async fn mock_delayed(&self, operation: &str, data: Value, delay: Duration) {
        Self::operation(operation)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": data }))
                    .set_delay(delay),
            )
            .with_priority(1)
            .mount(&self.shopify)
            .await;
    }

    /// `GET path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request(Method::GET, path).body(Body::empty());
        self.send(request.expect("valid request")).await
    }

    /// `POST path` with a url-encoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        let request = self
            .request(Method::POST, path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body));
        self.send(request.expect("valid request")).await
    }

    fn request(&self, method: Method, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body can be read");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
