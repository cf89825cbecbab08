//! Home page route handler.

use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::products::{ImageView, ProductCardView};
use crate::config::{FeatureBlock, Testimonial};
use crate::context::{Layout, RequestContext, RootData};
use crate::deferred::Deferred;
use crate::error::Result;
use crate::filters;
use crate::shopify::types::Collection;
use crate::state::AppState;

/// Featured collection banner.
#[derive(Clone)]
pub struct CollectionView {
    pub title: String,
    pub image: Option<ImageView>,
}

impl From<&Collection> for CollectionView {
    fn from(collection: &Collection) -> Self {
        Self {
            title: collection.title.clone(),
            image: collection
                .image
                .as_ref()
                .map(|image| ImageView::new(image, &collection.title)),
        }
    }
}

/// Home page template.
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    /// Image + text blocks, alternating sides.
    pub features: &'static [FeatureBlock],
    pub testimonials: &'static [Testimonial],
    pub featured_collection: Option<CollectionView>,
}

/// Recommended products grid, streamed in after the page.
#[derive(Template)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductCardView>,
}

/// Display the home page.
#[instrument(skip(state, ctx))]
pub async fn home(State(state): State<AppState>, ctx: RequestContext) -> Result<Response> {
    let client = state.storefront();
    let recommended = {
        let client = client.clone();
        Deferred::spawn(async move { client.get_recommended_products().await })
    };

    // The banner is decoration; the page renders without it
    let (root, featured_collection) = futures::join!(RootData::load(&state, &ctx), async {
        client.get_featured_collection().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch featured collection");
            None
        })
    });
    let root = root?;

    let html = HomeTemplate {
        layout: root.layout(&ctx, ctx.site.tagline),
        features: ctx.site.features,
        testimonials: ctx.site.testimonials,
        featured_collection: featured_collection.as_ref().map(CollectionView::from),
    }
    .render()?;

    Ok(root
        .stream(&ctx, html)
        .section(
            "recommended-products",
            recommended,
            |products| {
                ProductGridTemplate {
                    products: products.iter().map(ProductCardView::from).collect(),
                }
                .render()
            },
            "Ett problem uppstod",
        )
        .into_response())
}
