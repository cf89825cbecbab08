//! Cart form actions.
//!
//! Every cart form on the site posts to `/varukorg` with a hidden
//! `cartFormInput` field holding `{"action": <tag>, "inputs": {...}}`.
//! [`CartActionForm`] parses a submission into a typed [`CartAction`] and
//! [`CartHandler`] runs the one Storefront API operation the action maps to.
//!
//! ```text
//! LinesAdd            -> cartLinesAdd            (cartCreate without a cart)
//! LinesUpdate         -> cartLinesUpdate
//! LinesRemove         -> cartLinesRemove
//! DiscountCodesUpdate -> cartDiscountCodesUpdate (cartCreate without a cart)
//! BuyerIdentityUpdate -> cartBuyerIdentityUpdate (cartCreate without a cart)
//! ```

mod action;
mod handler;

pub use action::{
    CART_FORM_INPUT_FIELD, CartAction, CartActionError, CartActionForm, CartActionKind,
    REDIRECT_TO_FIELD, form_input,
};
pub use handler::{CART_NOT_FOUND, CartHandler};
