//! Newtype IDs for type-safe references to Shopify global IDs.
//!
//! Shopify identifies every object with an opaque global ID string such as
//! `gid://shopify/CartLine/abc?cart=xyz`. Use the `define_id!` macro to wrap
//! these so a cart line ID can never be passed where a variant ID is expected.

/// Macro to define a type-safe Shopify ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use stallmagneten_core::define_id;
/// define_id!(OrderId);
/// define_id!(ShopId);
///
/// let order = OrderId::new("gid://shopify/Order/1");
/// let shop = ShopId::new("gid://shopify/Shop/1");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = shop;
/// # assert_eq!(order.as_str(), "gid://shopify/Order/1");
/// # assert_eq!(shop.to_string(), "gid://shopify/Shop/1");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a Shopify global ID string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying global ID.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(CartId);
define_id!(CartLineId);
define_id!(MetaobjectId);
