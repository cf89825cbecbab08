//! Product type conversion functions.

use crate::shopify::types::Product;

use super::super::queries::wire::ProductNode;

/// Convert a product query node into a [`Product`].
///
/// Flattens the image and variant connections and drops metafields Shopify
/// returned as `null` (identifiers with no value on this product).
pub fn convert_product(node: ProductNode) -> Product {
    Product {
        id: node.id,
        handle: node.handle,
        title: node.title,
        vendor: node.vendor,
        description: node.description,
        description_html: node.description_html,
        images: node.images.nodes,
        options: node.options,
        metafields: node.metafields.into_iter().flatten().collect(),
        selected_variant: node.selected_variant,
        variants: node.variants.nodes,
    }
}
