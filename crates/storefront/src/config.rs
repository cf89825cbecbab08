//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., stallmagneten.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` - Storefront API private access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `STOREFRONT_SITE` - Brand to serve: `stallmagneten` or `skrotmagneten`
//! - `STOREFRONT_HEADER_MENU` - Header menu handle (default: main-menu)
//! - `STOREFRONT_FOOTER_MENU` - Footer menu handle (default: footer)
//! - `STOREFRONT_BLOG_HANDLE` - Blog handle (default: blogg)
//! - `STOREFRONT_CONTENT_DIR` - Markdown content directory
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `SHOPIFY_STOREFRONT_ENDPOINT` - Full GraphQL endpoint override
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry performance sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_CONTENT_DIR: &str = "crates/storefront/content";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Brand served by this instance
    pub site: Site,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Handle of the menu rendered in the header
    pub header_menu: String,
    /// Handle of the menu rendered in the footer
    pub footer_menu: String,
    /// Handle of the blog listed under `/blogg`
    pub blog_handle: String,
    /// Directory holding markdown content pages
    pub content_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of requests traced for Sentry performance monitoring
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., stallmagneten.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2024-01)
    pub api_version: String,
    /// Storefront API private access token (server-side only)
    pub storefront_private_token: SecretString,
    /// Full GraphQL endpoint, overriding the one derived from `store`
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_private_token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// The Storefront API GraphQL endpoint.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}/api/{}/graphql.json",
                self.store, self.api_version
            )
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2024-01"),
            storefront_private_token: get_validated_secret("SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?,
            endpoint: get_optional_env("SHOPIFY_STOREFRONT_ENDPOINT"),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let site = get_env_or_default("STOREFRONT_SITE", "stallmagneten")
            .parse::<Site>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_SITE".to_string(), e))?;
        let sentry_traces_sample_rate = get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            base_url,
            site,
            shopify: ShopifyStorefrontConfig::from_env()?,
            header_menu: get_env_or_default("STOREFRONT_HEADER_MENU", "main-menu"),
            footer_menu: get_env_or_default("STOREFRONT_FOOTER_MENU", "footer"),
            blog_handle: get_env_or_default("STOREFRONT_BLOG_HANDLE", "blogg"),
            content_dir: PathBuf::from(get_env_or_default(
                "STOREFRONT_CONTENT_DIR",
                DEFAULT_CONTENT_DIR,
            )),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Branding and homepage content for the configured site.
    #[must_use]
    pub const fn site_config(&self) -> &'static SiteConfig {
        self.site.config()
    }
}

// =============================================================================
// Site branding
// =============================================================================

/// The brands this storefront can serve.
///
/// Both brands share one Shopify store and one route table; only copy,
/// contact details and homepage content differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Site {
    #[default]
    Stallmagneten,
    Skrotmagneten,
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stallmagneten" => Ok(Self::Stallmagneten),
            "skrotmagneten" => Ok(Self::Skrotmagneten),
            other => Err(format!(
                "unknown site '{other}' (expected stallmagneten or skrotmagneten)"
            )),
        }
    }
}

impl Site {
    /// Static branding for this site.
    #[must_use]
    pub const fn config(self) -> &'static SiteConfig {
        match self {
            Self::Stallmagneten => &STALLMAGNETEN,
            Self::Skrotmagneten => &SKROTMAGNETEN,
        }
    }
}

/// Which side of a feature block the image sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSide {
    Left,
    Right,
}

/// An image + text block on the homepage.
#[derive(Debug)]
pub struct FeatureBlock {
    pub image_src: &'static str,
    pub title: &'static str,
    pub text: &'static str,
    pub image_side: ImageSide,
}

impl FeatureBlock {
    /// Whether the image renders left of the text.
    #[must_use]
    pub fn image_left(&self) -> bool {
        self.image_side == ImageSide::Left
    }
}

/// A customer quote shown on the homepage.
#[derive(Debug)]
pub struct Testimonial {
    pub name: &'static str,
    pub text: &'static str,
}

/// Per-brand copy and contact details.
#[derive(Debug)]
pub struct SiteConfig {
    /// Brand name, used as `<title>` prefix
    pub name: &'static str,
    /// Homepage `<title>` suffix
    pub tagline: &'static str,
    /// Heading above the product grid
    pub products_heading: &'static str,
    /// Contact email shown in footer and on the contact page
    pub contact_email: &'static str,
    /// Company line in the footer
    pub company: &'static str,
    pub features: &'static [FeatureBlock],
    pub testimonials: &'static [Testimonial],
}

impl SiteConfig {
    /// Format a page title as `"{brand} | {page}"`.
    #[must_use]
    pub fn title(&self, page: &str) -> String {
        format!("{} | {page}", self.name)
    }
}

static STALLMAGNETEN: SiteConfig = SiteConfig {
    name: "Stallmagneten",
    tagline: "Produkter för ett säkrare stall",
    products_heading: "Produkter för ett säkrare stall",
    contact_email: "hej@stallmagneten.se",
    company: "Stallmagneten, Sverige",
    features: &[
        FeatureBlock {
            image_src: "https://cdn.shopify.com/s/files/1/0847/4509/3413/files/skoning-hovslagare.jpg?v=1702589850",
            title: "Städa upp efter skoningen",
            text: "Hästsömmar och avklippta hovnubb hamnar lätt i spånet. Med Stallmagneten plockar du upp allt på några sekunder, innan det hamnar i en hov.",
            image_side: ImageSide::Right,
        },
        FeatureBlock {
            image_src: "https://cdn.shopify.com/s/files/1/0847/4509/3413/files/bekvam-stallmagnet.jpg?v=1702589624",
            title: "Bekväm utan ryggont",
            text: "Stallmagneten är enklare att använda än en sopkvast. Slipp böja på ryggen och låt hjulen rulla med lågt motstånd.",
            image_side: ImageSide::Left,
        },
        FeatureBlock {
            image_src: "https://cdn.shopify.com/s/files/1/0847/4509/3413/files/spik.jpg?v=1702584395",
            title: "Enkel och säker hantering",
            text: "Du släpper metallen med ett enkelt grepp på skaftet så du slipper ta bort metallen du samlat upp med fingrarna och riskera att skada dig.",
            image_side: ImageSide::Right,
        },
    ],
    testimonials: &[Testimonial {
        name: "Bridget, hovslagare",
        text: "Stallmagneten är numera lika självklar som hovtången. Spånet blir rent efter varje skoning.",
    }],
};

static SKROTMAGNETEN: SiteConfig = SiteConfig {
    name: "Skrotmagneten",
    tagline: "Aldrig mer punka med Skrotmagneten",
    products_heading: "Aldrig mer punka med Skrotmagneten",
    contact_email: "hej@stallmagneten.se",
    company: "Skrotmagneten, Sverige",
    features: &[
        FeatureBlock {
            image_src: "https://cdn.shopify.com/s/files/1/0847/4509/3413/files/spik.jpg?v=1702584395",
            title: "Tappade nycklar, spik eller annat magnetiskt",
            text: "Med starka magneter kan du snabbt och enkelt städa upp allt metallspill och undvika punka på bildäck eller trampa illa och få spik i skon...",
            image_side: ImageSide::Right,
        },
        FeatureBlock {
            image_src: "https://cdn.shopify.com/s/files/1/0847/4509/3413/files/bekvam-stallmagnet.jpg?v=1702589624",
            title: "Bekväm utan ryggont",
            text: "Skrotmagneten är enklare att använda än en sopkvast. Slipp böja på ryggen och låt hjulen rulla med lågt motstånd.",
            image_side: ImageSide::Left,
        },
        FeatureBlock {
            image_src: "https://cdn.shopify.com/s/files/1/0847/4509/3413/files/skoning-hovslagare.jpg?v=1702589850",
            title: "Enkel och säker hantering",
            text: "Du släpper metallen med ett enkelt grepp på skaftet så du slipper ta bort metallen du samlat upp med fingrarna och riskera att skada dig.",
            image_side: ImageSide::Right,
        },
        FeatureBlock {
            image_src: "https://cdn.shopify.com/s/files/1/0847/4509/3413/files/bekvam-stallmagnet.jpg?v=1702589624",
            title: "Miljötänk",
            text: "Separera all metall från ert skräp och sortera miljövänligt.",
            image_side: ImageSide::Left,
        },
    ],
    testimonials: &[Testimonial {
        name: "Jedhammars Byggtjänst",
        text: "Den var bättre än jag trodde och den plockar upp spik i gräset bra. Jag har även haft den till att plocka plåtspill efter plåtslagaren.",
    }],
};

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token from the Shopify admin."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
