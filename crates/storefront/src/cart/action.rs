//! Parsing cart form submissions.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shopify::types::{CartBuyerIdentityInput, CartLineId, CartLineInput, CartLineUpdateInput};

/// Form field holding the JSON `{action, inputs}` payload.
pub const CART_FORM_INPUT_FIELD: &str = "cartFormInput";

/// Form field naming where to send the browser after the action.
pub const REDIRECT_TO_FIELD: &str = "redirectTo";

// =============================================================================
// Action tags
// =============================================================================

/// The action tag a cart form declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartActionKind {
    LinesAdd,
    LinesUpdate,
    LinesRemove,
    DiscountCodesUpdate,
    BuyerIdentityUpdate,
}

impl CartActionKind {
    /// The tag as it appears in `cartFormInput`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinesAdd => "LinesAdd",
            Self::LinesUpdate => "LinesUpdate",
            Self::LinesRemove => "LinesRemove",
            Self::DiscountCodesUpdate => "DiscountCodesUpdate",
            Self::BuyerIdentityUpdate => "BuyerIdentityUpdate",
        }
    }
}

impl fmt::Display for CartActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartActionKind {
    type Err = CartActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LinesAdd" => Ok(Self::LinesAdd),
            "LinesUpdate" => Ok(Self::LinesUpdate),
            "LinesRemove" => Ok(Self::LinesRemove),
            "DiscountCodesUpdate" => Ok(Self::DiscountCodesUpdate),
            "BuyerIdentityUpdate" => Ok(Self::BuyerIdentityUpdate),
            other => Err(CartActionError::UnhandledAction(other.to_string())),
        }
    }
}

/// Errors parsing a cart form submission.
///
/// Messages are shown to shoppers, hence Swedish.
#[derive(Debug, Error)]
pub enum CartActionError {
    /// The form declared no action.
    #[error("Ingen åtgärd angiven")]
    MissingAction,

    /// The form declared an action the cart doesn't handle.
    #[error("{0} åtgärd för varukorgen är inte definierad")]
    UnhandledAction(String),

    /// `cartFormInput` is not valid JSON.
    #[error("Ogiltig cartFormInput: {0}")]
    InvalidFormInput(#[source] serde_json::Error),

    /// The inputs don't fit the declared action.
    #[error("Ogiltiga uppgifter för {action}: {source}")]
    InvalidInput {
        action: CartActionKind,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Typed actions
// =============================================================================

/// A parsed cart action with its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    LinesAdd {
        lines: Vec<CartLineInput>,
    },
    LinesUpdate {
        lines: Vec<CartLineUpdateInput>,
    },
    LinesRemove {
        line_ids: Vec<CartLineId>,
    },
    DiscountCodesUpdate {
        /// Code typed into the discount field, if any.
        discount_code: Option<String>,
        /// Codes already applied to the cart.
        discount_codes: Vec<String>,
    },
    BuyerIdentityUpdate {
        buyer_identity: CartBuyerIdentityInput,
    },
}

#[derive(Deserialize)]
struct LinesAddInputs {
    lines: Vec<CartLineInput>,
}

#[derive(Deserialize)]
struct LinesUpdateInputs {
    lines: Vec<CartLineUpdateInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinesRemoveInputs {
    line_ids: Vec<CartLineId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscountCodesInputs {
    #[serde(default)]
    discount_code: Option<String>,
    #[serde(default)]
    discount_codes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuyerIdentityInputs {
    #[serde(default)]
    buyer_identity: CartBuyerIdentityInput,
}

impl CartAction {
    /// Build the typed action for `kind` from its JSON inputs.
    ///
    /// # Errors
    ///
    /// Returns `CartActionError::InvalidInput` if the inputs are missing
    /// fields the action needs or have the wrong shape.
    pub fn from_inputs(kind: CartActionKind, inputs: Value) -> Result<Self, CartActionError> {
        fn parse<T: DeserializeOwned>(
            kind: CartActionKind,
            inputs: Value,
        ) -> Result<T, CartActionError> {
            serde_json::from_value(inputs)
                .map_err(|source| CartActionError::InvalidInput { action: kind, source })
        }

        Ok(match kind {
            CartActionKind::LinesAdd => {
                let LinesAddInputs { lines } = parse(kind, inputs)?;
                Self::LinesAdd { lines }
            }
            CartActionKind::LinesUpdate => {
                let LinesUpdateInputs { lines } = parse(kind, inputs)?;
                Self::LinesUpdate { lines }
            }
            CartActionKind::LinesRemove => {
                let LinesRemoveInputs { line_ids } = parse(kind, inputs)?;
                Self::LinesRemove { line_ids }
            }
            CartActionKind::DiscountCodesUpdate => {
                let DiscountCodesInputs {
                    discount_code,
                    discount_codes,
                } = parse(kind, inputs)?;
                Self::DiscountCodesUpdate {
                    discount_code: discount_code.filter(|code| !code.trim().is_empty()),
                    discount_codes,
                }
            }
            CartActionKind::BuyerIdentityUpdate => {
                let BuyerIdentityInputs { buyer_identity } = parse(kind, inputs)?;
                Self::BuyerIdentityUpdate { buyer_identity }
            }
        })
    }

    /// The tag this action was submitted with.
    #[must_use]
    pub const fn kind(&self) -> CartActionKind {
        match self {
            Self::LinesAdd { .. } => CartActionKind::LinesAdd,
            Self::LinesUpdate { .. } => CartActionKind::LinesUpdate,
            Self::LinesRemove { .. } => CartActionKind::LinesRemove,
            Self::DiscountCodesUpdate { .. } => CartActionKind::DiscountCodesUpdate,
            Self::BuyerIdentityUpdate { .. } => CartActionKind::BuyerIdentityUpdate,
        }
    }
}

// =============================================================================
// Form parsing
// =============================================================================

#[derive(Deserialize, Default)]
struct RawFormInput {
    action: Option<String>,
    #[serde(default)]
    inputs: Map<String, Value>,
}

/// A parsed cart form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartActionForm {
    pub action: CartAction,
    /// Same-site path to redirect to after the action, if requested.
    pub redirect_to: Option<String>,
}

impl CartActionForm {
    /// Parse urlencoded form fields.
    ///
    /// Fields other than `cartFormInput` and `redirectTo` are merged into
    /// `inputs`, overriding keys of the same name; a field submitted more
    /// than once becomes an array.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is missing or unknown, or its inputs
    /// don't parse.
    pub fn parse(fields: &[(String, String)]) -> Result<Self, CartActionError> {
        let raw = match field(fields, CART_FORM_INPUT_FIELD) {
            Some(json) => {
                serde_json::from_str::<RawFormInput>(json).map_err(CartActionError::InvalidFormInput)?
            }
            None => RawFormInput::default(),
        };

        let mut inputs = raw.inputs;
        inputs.extend(extra_fields(fields));

        let kind: CartActionKind = raw
            .action
            .filter(|action| !action.is_empty())
            .ok_or(CartActionError::MissingAction)?
            .parse()?;

        let action = CartAction::from_inputs(kind, Value::Object(inputs))?;

        let redirect_to = field(fields, REDIRECT_TO_FIELD).and_then(|target| {
            if is_local_path(target) {
                Some(target.to_string())
            } else {
                tracing::warn!(redirect_to = %target, "Ignoring off-site cart redirect");
                None
            }
        });

        Ok(Self {
            action,
            redirect_to,
        })
    }
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn extra_fields(fields: &[(String, String)]) -> Map<String, Value> {
    let mut extra = Map::new();
    for (key, value) in fields {
        if key == CART_FORM_INPUT_FIELD || key == REDIRECT_TO_FIELD {
            continue;
        }
        let value = Value::String(value.clone());
        match extra.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                extra.insert(key.clone(), value);
            }
        }
    }
    extra
}

/// Whether `target` is a path on this site (not `//host` or a full URL).
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

/// Serialize the hidden `cartFormInput` value for a cart form.
#[must_use]
pub fn form_input(kind: CartActionKind, inputs: Value) -> String {
    serde_json::json!({ "action": kind.as_str(), "inputs": inputs }).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_lines_add() {
        let input = form_input(
            CartActionKind::LinesAdd,
            json!({ "lines": [{ "merchandiseId": "gid://shopify/ProductVariant/1", "quantity": 1 }] }),
        );
        let form = CartActionForm::parse(&fields(&[
            (CART_FORM_INPUT_FIELD, &input),
            (REDIRECT_TO_FIELD, "/varukorg"),
        ]))
        .unwrap();

        assert_eq!(form.redirect_to.as_deref(), Some("/varukorg"));
        match form.action {
            CartAction::LinesAdd { lines } => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].merchandise_id.as_str(), "gid://shopify/ProductVariant/1");
                assert_eq!(lines[0].quantity, Some(1));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_lines_remove() {
        let input = form_input(
            CartActionKind::LinesRemove,
            json!({ "lineIds": ["gid://shopify/CartLine/1", "gid://shopify/CartLine/2"] }),
        );
        let form = CartActionForm::parse(&fields(&[(CART_FORM_INPUT_FIELD, &input)])).unwrap();
        assert_eq!(form.action.kind(), CartActionKind::LinesRemove);
        assert!(form.redirect_to.is_none());
    }

    #[test]
    fn test_typed_discount_code_joins_inputs() {
        let input = form_input(
            CartActionKind::DiscountCodesUpdate,
            json!({ "discountCodes": ["HOST10"] }),
        );
        let form = CartActionForm::parse(&fields(&[
            (CART_FORM_INPUT_FIELD, &input),
            ("discountCode", "VINTER"),
        ]))
        .unwrap();

        assert_eq!(
            form.action,
            CartAction::DiscountCodesUpdate {
                discount_code: Some("VINTER".to_string()),
                discount_codes: vec!["HOST10".to_string()],
            }
        );
    }

    #[test]
    fn test_blank_discount_code_is_ignored() {
        let input = form_input(CartActionKind::DiscountCodesUpdate, json!({}));
        let form = CartActionForm::parse(&fields(&[
            (CART_FORM_INPUT_FIELD, &input),
            ("discountCode", "  "),
        ]))
        .unwrap();

        assert_eq!(
            form.action,
            CartAction::DiscountCodesUpdate {
                discount_code: None,
                discount_codes: vec![],
            }
        );
    }

    #[test]
    fn test_repeated_fields_become_arrays() {
        let extra = extra_fields(&fields(&[("lineIds", "a"), ("lineIds", "b"), ("x", "1")]));
        assert_eq!(extra["lineIds"], json!(["a", "b"]));
        assert_eq!(extra["x"], json!("1"));
    }

    #[test]
    fn test_missing_action() {
        let err = CartActionForm::parse(&fields(&[("discountCode", "X")])).unwrap_err();
        assert!(matches!(err, CartActionError::MissingAction));
        assert_eq!(err.to_string(), "Ingen åtgärd angiven");
    }

    #[test]
    fn test_unhandled_action() {
        let input = form_input(CartActionKind::LinesAdd, json!({}))
            .replace("LinesAdd", "NoteUpdate");
        let err = CartActionForm::parse(&fields(&[(CART_FORM_INPUT_FIELD, &input)])).unwrap_err();
        assert!(matches!(err, CartActionError::UnhandledAction(ref tag) if tag == "NoteUpdate"));
        assert_eq!(
            err.to_string(),
            "NoteUpdate åtgärd för varukorgen är inte definierad"
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let input = form_input(CartActionKind::LinesUpdate, json!({ "lines": "nope" }));
        let err = CartActionForm::parse(&fields(&[(CART_FORM_INPUT_FIELD, &input)])).unwrap_err();
        assert!(matches!(
            err,
            CartActionError::InvalidInput {
                action: CartActionKind::LinesUpdate,
                ..
            }
        ));
    }

    #[test]
    fn test_off_site_redirect_is_dropped() {
        let input = form_input(CartActionKind::LinesRemove, json!({ "lineIds": [] }));
        for target in ["https://evil.example", "//evil.example", "varukorg"] {
            let form = CartActionForm::parse(&fields(&[
                (CART_FORM_INPUT_FIELD, &input),
                (REDIRECT_TO_FIELD, target),
            ]))
            .unwrap();
            assert!(form.redirect_to.is_none(), "{target} should be dropped");
        }
    }
}
