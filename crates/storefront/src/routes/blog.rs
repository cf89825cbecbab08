//! Blog route handlers.
//!
//! Articles come from the Shopify blog named by `STOREFRONT_BLOG_HANDLE`.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::products::{ImageView, PaginationQuery};
use crate::context::{Layout, RequestContext, RootData};
use crate::error::{AppError, Result};
use crate::filters;
use crate::shopify::types::Article;
use crate::state::AppState;

/// Path of the blog index.
pub const BLOG_PATH: &str = "/blogg";

/// Articles shown per page.
const ARTICLES_PER_PAGE: u32 = 3;

/// Article view for templates.
#[derive(Clone)]
pub struct ArticleView {
    pub title: String,
    pub url: String,
    pub image: Option<ImageView>,
    pub author: Option<String>,
    /// `YYYY-MM-DD`
    pub published_at: String,
    pub content_html: String,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            url: format!("{BLOG_PATH}/{}", article.handle),
            image: article
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &article.title)),
            author: article.author.as_ref().map(|author| author.name.clone()),
            published_at: article.published_at.format("%Y-%m-%d").to_string(),
            content_html: article.content_html.clone(),
        }
    }
}

/// Blog index page template.
#[derive(Template)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub layout: Layout,
    pub articles: Vec<ArticleView>,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

/// Blog article template.
#[derive(Template)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub layout: Layout,
    pub article: ArticleView,
}

/// Display a page of blog articles.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<PaginationQuery>,
) -> Result<Response> {
    let (root, blog) = futures::try_join!(RootData::load(&state, &ctx), async {
        state
            .storefront()
            .get_articles(
                &state.config().blog_handle,
                query.variables(ARTICLES_PER_PAGE),
            )
            .await
            .map_err(AppError::from)
    })?;

    let html = BlogIndexTemplate {
        layout: root.layout(&ctx, "Blogg"),
        articles: blog.articles.iter().map(ArticleView::from).collect(),
        previous_href: blog.page_info.previous_href(BLOG_PATH),
        next_href: blog.page_info.next_href(BLOG_PATH),
    }
    .render()?;

    Ok(root.stream(&ctx, html).into_response())
}

/// Display a single blog article.
///
/// # Errors
///
/// Returns 404 if the article doesn't exist.
#[instrument(skip(state, ctx), fields(handle = %handle))]
pub async fn show(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(handle): Path<String>,
) -> Result<Response> {
    let (root, article) = futures::try_join!(RootData::load(&state, &ctx), async {
        state
            .storefront()
            .get_article(&state.config().blog_handle, &handle)
            .await
            .map_err(AppError::from)
    })?;

    let html = BlogShowTemplate {
        layout: root.layout(&ctx, &format!("{} bloggpost", article.title)),
        article: ArticleView::from(&article),
    }
    .render()?;

    Ok(root.stream(&ctx, html).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn article() -> Article {
        serde_json::from_value(json!({
            "id": "gid://shopify/Article/1",
            "handle": "vinterskoning",
            "title": "Vinterskoning",
            "contentHtml": "<p>Brodd eller inte?</p>",
            "publishedAt": "2024-01-15T08:30:00Z",
            "authorV2": { "name": "Bridget" },
            "image": null
        }))
        .unwrap()
    }

    #[test]
    fn test_article_view() {
        let view = ArticleView::from(&article());
        assert_eq!(view.url, "/blogg/vinterskoning");
        assert_eq!(view.published_at, "2024-01-15");
        assert_eq!(view.author.as_deref(), Some("Bridget"));
        assert!(view.image.is_none());
    }
}
