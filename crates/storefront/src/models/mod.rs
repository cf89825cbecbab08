//! Types the storefront keeps in the visitor's session.

pub mod session;

pub use session::{CustomerAccessToken, keys as session_keys};
