//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with a
//! module of the same (snake case) name holding its `Variables` and
//! `ResponseData`, the layout `graphql_client`'s derive generates.
//! Documents are assembled from shared fragments with `concat!`.

use graphql_client::{GraphQLQuery, QueryBody};

macro_rules! operation {
    ($name:ident, $module:ident, $document:expr) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $document,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

// =============================================================================
// Fragments
// =============================================================================

macro_rules! money_fragment {
    () => {
        "fragment Money on MoneyV2 { amount currencyCode }\n"
    };
}

macro_rules! image_fragment {
    () => {
        "fragment Image on Image { url altText width height }\n"
    };
}

macro_rules! menu_fragment {
    () => {
        "fragment MenuItem on MenuItem { id title url }\n\
         fragment Menu on Menu { id items { ...MenuItem items { ...MenuItem } } }\n"
    };
}

macro_rules! product_variant_fragment {
    () => {
        "fragment ProductVariant on ProductVariant {\n\
           id title availableForSale sku\n\
           selectedOptions { name value }\n\
           price { ...Money }\n\
           compareAtPrice { ...Money }\n\
           image { ...Image }\n\
           product { title handle }\n\
         }\n"
    };
}

macro_rules! product_item_fragment {
    () => {
        "fragment ProductItem on Product {\n\
           id handle title availableForSale\n\
           featuredImage { ...Image }\n\
           priceRange { minVariantPrice { ...Money } maxVariantPrice { ...Money } }\n\
           variants(first: 1) { nodes { id selectedOptions { name value } } }\n\
         }\n"
    };
}

macro_rules! metaobject_fragment {
    () => {
        "fragment Metaobject on Metaobject { id fields { key value } }\n"
    };
}

macro_rules! article_fragment {
    () => {
        "fragment ArticleItem on Article {\n\
           id handle title contentHtml publishedAt\n\
           authorV2 { name }\n\
           image { ...Image }\n\
         }\n"
    };
}

macro_rules! policy_fragment {
    () => {
        "fragment Policy on ShopPolicy { id handle title body }\n"
    };
}

macro_rules! cart_fragment {
    () => {
        "fragment CartApiQuery on Cart {\n\
           id checkoutUrl totalQuantity\n\
           cost { subtotalAmount { ...Money } totalAmount { ...Money } }\n\
           discountCodes { code applicable }\n\
           lines(first: 100) {\n\
             nodes {\n\
               ... on CartLine {\n\
                 id quantity\n\
                 cost {\n\
                   amountPerQuantity { ...Money }\n\
                   totalAmount { ...Money }\n\
                   compareAtAmountPerQuantity { ...Money }\n\
                 }\n\
                 merchandise {\n\
                   ... on ProductVariant {\n\
                     id title\n\
                     image { ...Image }\n\
                     selectedOptions { name value }\n\
                     product { id handle title }\n\
                   }\n\
                 }\n\
               }\n\
             }\n\
           }\n\
         }\n"
    };
}

macro_rules! user_error_fields {
    () => {
        "userErrors { code field message }\n"
    };
}

// =============================================================================
// Shared wire types
// =============================================================================

/// Wire types shared by several operations.
pub mod wire {
    use serde::Deserialize;

    use crate::shopify::types::{
        CartCost, CartDiscountCode, CartId, CartLine, CartUserError, Connection, Image, Metafield,
        ProductId, ProductOption, ProductVariant,
    };

    /// Product as returned by the product query.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductNode {
        pub id: ProductId,
        pub handle: String,
        pub title: String,
        pub vendor: String,
        pub description: String,
        pub description_html: String,
        pub images: Connection<Image>,
        pub options: Vec<ProductOption>,
        pub metafields: Vec<Option<Metafield>>,
        pub selected_variant: Option<ProductVariant>,
        pub variants: Connection<ProductVariant>,
    }

    /// Cart as returned by cart queries and mutations.
    ///
    /// Lines that are not plain `CartLine`s (bundles) arrive as empty
    /// objects and are skipped during conversion.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartNode {
        pub id: CartId,
        pub checkout_url: String,
        pub total_quantity: i64,
        pub cost: CartCost,
        pub discount_codes: Vec<CartDiscountCode>,
        pub lines: Connection<CartLineNode>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(untagged)]
    pub enum CartLineNode {
        Line(Box<CartLine>),
        Other(serde::de::IgnoredAny),
    }

    /// Payload shared by every cart mutation.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartMutationPayload {
        pub cart: Option<CartNode>,
        #[serde(default)]
        pub user_errors: Vec<CartUserError>,
    }
}

// =============================================================================
// Layout queries
// =============================================================================

operation!(
    Header,
    header,
    concat!(
        "query Header($headerMenuHandle: String!) {\n\
           shop { id name description primaryDomain { url } }\n\
           menu(handle: $headerMenuHandle) { ...Menu }\n\
         }\n",
        menu_fragment!()
    )
);

pub mod header {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Menu, Shop};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub header_menu_handle: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub shop: Shop,
        pub menu: Option<Menu>,
    }
}

operation!(
    Footer,
    footer,
    concat!(
        "query Footer($footerMenuHandle: String!) {\n\
           menu(handle: $footerMenuHandle) { ...Menu }\n\
         }\n",
        menu_fragment!()
    )
);

pub mod footer {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::Menu;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub footer_menu_handle: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub menu: Option<Menu>,
    }
}

// =============================================================================
// Product queries
// =============================================================================

operation!(
    Product,
    product,
    concat!(
        "query Product($handle: String!, $selectedOptions: [SelectedOptionInput!]!) {\n\
           product(handle: $handle) {\n\
             id handle title vendor description descriptionHtml\n\
             images(first: 10) { nodes { ...Image } }\n\
             options { name values }\n\
             metafields(identifiers: [\
               {namespace: \"custom\", key: \"technical_details\"}, \
               {namespace: \"custom\", key: \"cart_upsells\"}\
             ]) { key value }\n\
             selectedVariant: variantBySelectedOptions(selectedOptions: $selectedOptions) {\n\
               ...ProductVariant\n\
             }\n\
             variants(first: 1) { nodes { ...ProductVariant } }\n\
           }\n\
         }\n",
        product_variant_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod product {
    use serde::{Deserialize, Serialize};

    use super::wire::ProductNode;
    use crate::shopify::types::SelectedOption;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub selected_options: Vec<SelectedOption>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductNode>,
    }
}

operation!(
    ProductVariants,
    product_variants,
    concat!(
        "query ProductVariants($handle: String!) {\n\
           product(handle: $handle) { variants(first: 250) { nodes { ...ProductVariant } } }\n\
         }\n",
        product_variant_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod product_variants {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Connection, ProductVariant};

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct VariantsNode {
        pub variants: Connection<ProductVariant>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub product: Option<VariantsNode>,
    }
}

operation!(
    Products,
    products,
    concat!(
        "query Products($first: Int, $last: Int, $startCursor: String, $endCursor: String) {\n\
           products(first: $first, last: $last, before: $startCursor, after: $endCursor) {\n\
             nodes { ...ProductItem }\n\
             pageInfo { hasNextPage hasPreviousPage startCursor endCursor }\n\
           }\n\
         }\n",
        product_item_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod products {
    use serde::Deserialize;

    use crate::shopify::types::{PaginatedConnection, ProductSummary};

    pub type Variables = stallmagneten_core::PaginationVariables;

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub products: PaginatedConnection<ProductSummary>,
    }
}

operation!(
    UpsellProducts,
    upsell_products,
    concat!(
        "query UpsellProducts($first: Int) {\n\
           products(first: $first) { nodes { ...ProductItem } }\n\
         }\n",
        product_item_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod upsell_products {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Connection, ProductSummary};

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub first: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductSummary>,
    }
}

operation!(
    RecommendedProducts,
    recommended_products,
    concat!(
        "query RecommendedProducts {\n\
           products(first: 4, sortKey: UPDATED_AT, reverse: true) { nodes { ...ProductItem } }\n\
         }\n",
        product_item_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod recommended_products {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Connection, ProductSummary};

    #[derive(Debug, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductSummary>,
    }
}

operation!(
    FeaturedCollection,
    featured_collection,
    concat!(
        "query FeaturedCollection {\n\
           collections(first: 1, sortKey: UPDATED_AT, reverse: true) {\n\
             nodes { id title handle image { ...Image } }\n\
           }\n\
         }\n",
        image_fragment!()
    )
);

pub mod featured_collection {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Collection, Connection};

    #[derive(Debug, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub collections: Connection<Collection>,
    }
}

// =============================================================================
// Metaobjects
// =============================================================================

operation!(
    MetaObject,
    meta_object,
    concat!(
        "query MetaObject($id: ID!) { metaobject(id: $id) { ...Metaobject } }\n",
        metaobject_fragment!()
    )
);

pub mod meta_object {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Metaobject, MetaobjectId};

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub id: MetaobjectId,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub metaobject: Option<Metaobject>,
    }
}

operation!(
    MetaObjects,
    meta_objects,
    concat!(
        "query MetaObjects($type: String!) {\n\
           metaobjects(first: 10, type: $type) { nodes { ...Metaobject } }\n\
         }\n",
        metaobject_fragment!()
    )
);

pub mod meta_objects {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Connection, Metaobject};

    #[derive(Debug, Serialize)]
    pub struct Variables {
        #[serde(rename = "type")]
        pub kind: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub metaobjects: Connection<Metaobject>,
    }
}

// =============================================================================
// Content queries
// =============================================================================

operation!(
    Page,
    page,
    "query Page($handle: String!) { page(handle: $handle) { id handle title body } }\n"
);

pub mod page {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub page: Option<crate::shopify::types::Page>,
    }
}

operation!(
    Article,
    article,
    concat!(
        "query Article($blogHandle: String!, $articleHandle: String!) {\n\
           blog(handle: $blogHandle) { articleByHandle(handle: $articleHandle) { ...ArticleItem } }\n\
         }\n",
        article_fragment!(),
        image_fragment!()
    )
);

pub mod article {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::Article;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub blog_handle: String,
        pub article_handle: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BlogNode {
        pub article_by_handle: Option<Article>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub blog: Option<BlogNode>,
    }
}

operation!(
    Articles,
    articles,
    concat!(
        "query Articles($blogHandle: String!, $first: Int, $last: Int, $startCursor: String, $endCursor: String) {\n\
           blog(handle: $blogHandle) {\n\
             title\n\
             articles(first: $first, last: $last, before: $startCursor, after: $endCursor) {\n\
               nodes { ...ArticleItem }\n\
               pageInfo { hasNextPage hasPreviousPage startCursor endCursor }\n\
             }\n\
           }\n\
         }\n",
        article_fragment!(),
        image_fragment!()
    )
);

pub mod articles {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Article, PaginatedConnection};
    use stallmagneten_core::PaginationVariables;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub blog_handle: String,
        #[serde(flatten)]
        pub pagination: PaginationVariables,
    }

    #[derive(Debug, Deserialize)]
    pub struct BlogNode {
        pub title: String,
        pub articles: PaginatedConnection<Article>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub blog: Option<BlogNode>,
    }
}

operation!(
    Policies,
    policies,
    concat!(
        "query Policies {\n\
           shop {\n\
             privacyPolicy { ...Policy }\n\
             shippingPolicy { ...Policy }\n\
             termsOfService { ...Policy }\n\
             refundPolicy { ...Policy }\n\
           }\n\
         }\n",
        policy_fragment!()
    )
);

pub mod policies {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::Policy;

    #[derive(Debug, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShopPolicies {
        pub privacy_policy: Option<Policy>,
        pub shipping_policy: Option<Policy>,
        pub terms_of_service: Option<Policy>,
        pub refund_policy: Option<Policy>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub shop: ShopPolicies,
    }
}

// =============================================================================
// Cart query and mutations
// =============================================================================

operation!(
    CartQuery,
    cart_query,
    concat!(
        "query CartQuery($cartId: ID!) { cart(id: $cartId) { ...CartApiQuery } }\n",
        cart_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod cart_query {
    use serde::{Deserialize, Serialize};

    use super::wire::CartNode;
    use crate::shopify::types::CartId;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: CartId,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<CartNode>,
    }
}

operation!(
    CartCreate,
    cart_create,
    concat!(
        "mutation CartCreate($input: CartInput!) {\n\
           cartCreate(input: $input) { cart { ...CartApiQuery } ",
        user_error_fields!(),
        "} }\n",
        cart_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod cart_create {
    use serde::{Deserialize, Serialize};

    use super::wire::CartMutationPayload;
    use crate::shopify::types::CartInput;

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartMutationPayload>,
    }
}

operation!(
    CartLinesAdd,
    cart_lines_add,
    concat!(
        "mutation CartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!) {\n\
           cartLinesAdd(cartId: $cartId, lines: $lines) { cart { ...CartApiQuery } ",
        user_error_fields!(),
        "} }\n",
        cart_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod cart_lines_add {
    use serde::{Deserialize, Serialize};

    use super::wire::CartMutationPayload;
    use crate::shopify::types::{CartId, CartLineInput};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: CartId,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<CartMutationPayload>,
    }
}

operation!(
    CartLinesUpdate,
    cart_lines_update,
    concat!(
        "mutation CartLinesUpdate($cartId: ID!, $lines: [CartLineUpdateInput!]!) {\n\
           cartLinesUpdate(cartId: $cartId, lines: $lines) { cart { ...CartApiQuery } ",
        user_error_fields!(),
        "} }\n",
        cart_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod cart_lines_update {
    use serde::{Deserialize, Serialize};

    use super::wire::CartMutationPayload;
    use crate::shopify::types::{CartId, CartLineUpdateInput};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: CartId,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<CartMutationPayload>,
    }
}

operation!(
    CartLinesRemove,
    cart_lines_remove,
    concat!(
        "mutation CartLinesRemove($cartId: ID!, $lineIds: [ID!]!) {\n\
           cartLinesRemove(cartId: $cartId, lineIds: $lineIds) { cart { ...CartApiQuery } ",
        user_error_fields!(),
        "} }\n",
        cart_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod cart_lines_remove {
    use serde::{Deserialize, Serialize};

    use super::wire::CartMutationPayload;
    use crate::shopify::types::{CartId, CartLineId};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: CartId,
        pub line_ids: Vec<CartLineId>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_remove: Option<CartMutationPayload>,
    }
}

operation!(
    CartDiscountCodesUpdate,
    cart_discount_codes_update,
    concat!(
        "mutation CartDiscountCodesUpdate($cartId: ID!, $discountCodes: [String!]) {\n\
           cartDiscountCodesUpdate(cartId: $cartId, discountCodes: $discountCodes) { cart { ...CartApiQuery } ",
        user_error_fields!(),
        "} }\n",
        cart_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod cart_discount_codes_update {
    use serde::{Deserialize, Serialize};

    use super::wire::CartMutationPayload;
    use crate::shopify::types::CartId;

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: CartId,
        pub discount_codes: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_discount_codes_update: Option<CartMutationPayload>,
    }
}

operation!(
    CartBuyerIdentityUpdate,
    cart_buyer_identity_update,
    concat!(
        "mutation CartBuyerIdentityUpdate($cartId: ID!, $buyerIdentity: CartBuyerIdentityInput!) {\n\
           cartBuyerIdentityUpdate(cartId: $cartId, buyerIdentity: $buyerIdentity) { cart { ...CartApiQuery } ",
        user_error_fields!(),
        "} }\n",
        cart_fragment!(),
        money_fragment!(),
        image_fragment!()
    )
);

pub mod cart_buyer_identity_update {
    use serde::{Deserialize, Serialize};

    use super::wire::CartMutationPayload;
    use crate::shopify::types::{CartBuyerIdentityInput, CartId};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: CartId,
        pub buyer_identity: CartBuyerIdentityInput,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_buyer_identity_update: Option<CartMutationPayload>,
    }
}
