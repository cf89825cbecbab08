//! Content page route handlers.
//!
//! Serves the markdown pages shipped with the storefront (about, contact,
//! terms, returns) and CMS pages managed in Shopify.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use tracing::instrument;

use crate::context::{Layout, RequestContext, RootData};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Markdown content page template.
#[derive(Template)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub layout: Layout,
    pub description: Option<String>,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// Shopify CMS page template.
#[derive(Template)]
#[template(path = "pages/cms.html")]
pub struct CmsPageTemplate {
    pub layout: Layout,
    pub title: String,
    pub body: String,
}

/// Serve a markdown content page by slug.
async fn serve_content_page(state: &AppState, ctx: &RequestContext, slug: &str) -> Result<Response> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("content page {slug}")))?;

    let root = RootData::load(state, ctx).await?;
    let html = ContentPageTemplate {
        layout: root.layout(ctx, &page.meta.title),
        description: page.meta.description.clone(),
        updated_at: page.meta.updated_at,
        content_html: page.content_html.clone(),
    }
    .render()?;

    Ok(root.stream(ctx, html).into_response())
}

/// Display the About page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, ctx))]
pub async fn about(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    serve_content_page(&state, &ctx, "om-oss").await
}

/// Display the Contact page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, ctx))]
pub async fn contact(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    serve_content_page(&state, &ctx, "kontakt").await
}

/// Display the Terms of Purchase page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, ctx))]
pub async fn terms(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    serve_content_page(&state, &ctx, "kopvillkor").await
}

/// Display the Return Policy page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip(state, ctx))]
pub async fn returns(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    serve_content_page(&state, &ctx, "returpolicy").await
}

/// Display a page managed in the Shopify admin.
///
/// # Errors
///
/// Returns 404 if Shopify has no page with this handle.
#[instrument(skip(state, ctx), fields(handle = %handle))]
pub async fn cms(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(handle): Path<String>,
) -> Result<Response> {
    let (root, page) = futures::try_join!(RootData::load(&state, &ctx), async {
        state.storefront().get_page(&handle).await.map_err(AppError::from)
    })?;

    let html = CmsPageTemplate {
        layout: root.layout(&ctx, &page.title),
        title: page.title,
        body: page.body,
    }
    .render()?;

    Ok(root.stream(&ctx, html).into_response())
}
