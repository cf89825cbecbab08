//! Markdown pages shipped with the storefront.
//!
//! Loads `pages/*.md` from the content directory at startup, parses the
//! YAML frontmatter and renders the body to HTML. Pages are served at
//! `/{slug}` (e.g. `content/pages/om-oss.md` → `/om-oss`).
//!
//! ```markdown
//! ---
//! title: Om oss
//! description: Från IT-försäljning till hovslageri
//! ---
//!
//! Efter större delen av mitt yrkesverksamma liv ...
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Frontmatter of a content page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct ContentPage {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// Content store that holds all loaded pages in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, ContentPage>>,
}

impl ContentStore {
    /// Load all pages under `content_dir/pages`.
    ///
    /// A missing directory yields an empty store. Files that fail to parse
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "Pages directory does not exist");
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match load_page(&path) {
                    Ok(page) => {
                        tracing::info!(slug = %page.slug, "Loaded page");
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "Failed to load page");
                    }
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Build a store from in-memory markdown sources, keyed by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if any source has missing or invalid frontmatter.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ContentError> {
        let pages = sources
            .into_iter()
            .map(|(slug, source)| parse_page(slug, source).map(|page| (slug.to_string(), page)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&ContentPage> {
        self.pages.get(slug)
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no pages were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn load_page(path: &Path) -> Result<ContentPage, ContentError> {
    let source = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;

    parse_page(slug, &source)
}

fn parse_page(slug: &str, source: &str) -> Result<ContentPage, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(source)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(ContentPage {
        slug: slug.to_string(),
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    // Pages embed images and address blocks as raw HTML
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
