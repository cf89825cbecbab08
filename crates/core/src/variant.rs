//! Product variant selection.
//!
//! A product has a list of options (`Size`, `Color`, ...) and a set of
//! variants, each identified by its full set of selected option values. The
//! storefront encodes the shopper's selection in the query string
//! (`/produkter/skrotmagnet?Storlek=60+cm`), so the functions here:
//!
//! - turn query parameters into a selection, dropping tracking parameters
//! - find the variant whose options exactly match a selection
//! - decide whether a product page renders a variant or redirects to the
//!   canonical URL of its first variant
//! - build the URL every option value leads to, for option pickers

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Query parameter prefixes that never name a product option.
///
/// Covers Shopify predictive search parameters and third-party click IDs.
pub const IGNORED_PARAM_PREFIXES: &[&str] = &["_sid", "_pos", "_psq", "_ss", "_v", "fbclid"];

/// Option name Shopify gives products that have no real options.
pub const DEFAULT_OPTION_NAME: &str = "Title";

/// Option value Shopify gives products that have no real options.
pub const DEFAULT_OPTION_VALUE: &str = "Default Title";

/// A single option name/value pair on a variant or in a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Storlek").
    pub name: String,
    /// Option value (e.g., "60 cm").
    pub value: String,
}

impl SelectedOption {
    /// Create a new option pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this is Shopify's placeholder `Title: Default Title` option.
    #[must_use]
    pub fn is_default_title(&self) -> bool {
        self.name == DEFAULT_OPTION_NAME && self.value == DEFAULT_OPTION_VALUE
    }
}

/// A product option definition with its ordered values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name.
    pub name: String,
    /// Possible values, in merchant-defined order.
    pub values: Vec<String>,
}

/// Anything that carries a variant's selected options and availability.
pub trait VariantLike {
    /// The full set of option values identifying this variant.
    fn selected_options(&self) -> &[SelectedOption];

    /// Whether the variant can currently be purchased.
    fn available_for_sale(&self) -> bool;
}

/// Option picker data for one product option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOption {
    /// Option name.
    pub name: String,
    /// One entry per option value.
    pub values: Vec<VariantOptionValue>,
}

/// A single selectable value in an option picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantOptionValue {
    /// The option value.
    pub value: String,
    /// Whether the variant this value leads to can be purchased.
    pub is_available: bool,
    /// Whether this value is part of the current selection.
    pub is_active: bool,
    /// URL of the product page with this value selected.
    pub to: String,
}

/// Outcome of resolving a product page's variant.
#[derive(Debug, PartialEq, Eq)]
pub enum VariantResolution<'a, V> {
    /// Render the page with this variant selected.
    Selected(&'a V),
    /// Redirect to this URL (the first variant's canonical URL).
    Redirect(String),
    /// The product has no variants at all.
    NoVariants,
}

/// Build a selection from query parameters.
///
/// Every parameter becomes a selected option except those whose name starts
/// with one of [`IGNORED_PARAM_PREFIXES`].
#[must_use]
pub fn selected_options_from_query(params: &[(String, String)]) -> Vec<SelectedOption> {
    params
        .iter()
        .filter(|(name, _)| {
            !IGNORED_PARAM_PREFIXES
                .iter()
                .any(|prefix| name.starts_with(prefix))
        })
        .map(|(name, value)| SelectedOption::new(name.clone(), value.clone()))
        .collect()
}

/// Whether a variant's options equal a selection, compared as sets.
#[must_use]
pub fn options_match(options: &[SelectedOption], selection: &[SelectedOption]) -> bool {
    options.len() == selection.len()
        && options.iter().all(|option| selection.contains(option))
        && selection.iter().all(|option| options.contains(option))
}

/// Find the variant whose selected options exactly match `selection`.
///
/// Returns `None` when the selection is partial, names an unknown value or
/// carries options the variant doesn't have.
#[must_use]
pub fn find_variant<'a, V: VariantLike>(
    variants: &'a [V],
    selection: &[SelectedOption],
) -> Option<&'a V> {
    variants
        .iter()
        .find(|variant| options_match(variant.selected_options(), selection))
}

/// Whether a variant is Shopify's single default variant.
#[must_use]
pub fn is_default_variant<V: VariantLike>(variant: &V) -> bool {
    variant
        .selected_options()
        .iter()
        .any(SelectedOption::is_default_title)
}

/// Drop the placeholder `Title: Default Title` option for display.
#[must_use]
pub fn filter_default_title(options: &[SelectedOption]) -> Vec<&SelectedOption> {
    options
        .iter()
        .filter(|option| !option.is_default_title())
        .collect()
}

/// Decide which variant a product page shows.
///
/// - A product whose first variant is the default variant always shows it.
/// - Otherwise the variant the backend resolved from the selection wins.
/// - Otherwise a locally known variant matching the selection exactly.
/// - Otherwise the page redirects to the first variant's URL, keeping the
///   request's other query parameters.
#[must_use]
pub fn resolve_variant<'a, V: VariantLike>(
    path_prefix: &str,
    handle: &str,
    backend_selected: Option<&'a V>,
    known_variants: &'a [V],
    selection: &[SelectedOption],
    search_params: &[(String, String)],
) -> VariantResolution<'a, V> {
    let Some(first) = known_variants.first() else {
        return backend_selected.map_or(VariantResolution::NoVariants, VariantResolution::Selected);
    };

    if is_default_variant(first) {
        return VariantResolution::Selected(first);
    }

    if let Some(selected) = backend_selected {
        return VariantResolution::Selected(selected);
    }

    if let Some(matched) = find_variant(known_variants, selection) {
        return VariantResolution::Selected(matched);
    }

    VariantResolution::Redirect(variant_url(
        path_prefix,
        handle,
        first.selected_options(),
        search_params,
    ))
}

/// Build the canonical URL of a product with the given options selected.
///
/// Each option overwrites an existing query parameter of the same name (in
/// place, dropping duplicates) or is appended. Other parameters are kept in
/// their original order.
#[must_use]
pub fn variant_url(
    path_prefix: &str,
    handle: &str,
    selected_options: &[SelectedOption],
    search_params: &[(String, String)],
) -> String {
    let mut params = search_params.to_vec();
    for option in selected_options {
        set_param(&mut params, &option.name, &option.value);
    }
    with_query(&format!("{path_prefix}/{handle}"), &params)
}

/// Build option picker data for every option of a product.
///
/// Options with a single value are not rendered as pickers, but their value
/// still takes part in matching. While the full variant list is still
/// loading (`variants` empty) every value is reported as available.
#[must_use]
pub fn variant_options<V: VariantLike>(
    path_prefix: &str,
    handle: &str,
    options: &[ProductOption],
    variants: &[V],
    selected_variant: Option<&V>,
    search_params: &[(String, String)],
) -> Vec<VariantOption> {
    let path = format!("{path_prefix}/{handle}");

    // Options with exactly one value are implicitly selected
    let mut base_params = search_params.to_vec();
    for option in options {
        if let [only] = option.values.as_slice() {
            set_param(&mut base_params, &option.name, only);
        }
    }

    options
        .iter()
        .filter(|option| option.values.len() > 1)
        .map(|option| {
            let active_value = get_param(search_params, &option.name).or_else(|| {
                selected_variant.and_then(|variant| {
                    variant
                        .selected_options()
                        .iter()
                        .find(|selected| selected.name == option.name)
                        .map(|selected| selected.value.as_str())
                })
            });

            let values = option
                .values
                .iter()
                .map(|value| {
                    let mut params = base_params.clone();
                    set_param(&mut params, &option.name, value);

                    let hypothetical = selection_for(options, &params);
                    let is_available = if variants.is_empty() {
                        true
                    } else {
                        find_variant(variants, &hypothetical)
                            .is_some_and(VariantLike::available_for_sale)
                    };

                    VariantOptionValue {
                        value: value.clone(),
                        is_available,
                        is_active: active_value == Some(value.as_str()),
                        to: with_query(&path, &params),
                    }
                })
                .collect();

            VariantOption {
                name: option.name.clone(),
                values,
            }
        })
        .collect()
}

/// Restrict query parameters to the product's own option names.
fn selection_for(options: &[ProductOption], params: &[(String, String)]) -> Vec<SelectedOption> {
    options
        .iter()
        .filter_map(|option| {
            get_param(params, &option.name).map(|value| SelectedOption::new(&option.name, value))
        })
        .collect()
}

fn get_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// `URLSearchParams.set` semantics: replace the first occurrence, drop the rest.
fn set_param(params: &mut Vec<(String, String)>, name: &str, value: &str) {
    match params.iter().position(|(key, _)| key == name) {
        Some(index) => {
            let mut seen = 0_usize;
            params.retain(|(key, _)| {
                if key == name {
                    seen += 1;
                    seen == 1
                } else {
                    true
                }
            });
            if let Some(entry) = params.get_mut(index) {
                entry.1 = value.to_string();
            }
        }
        None => params.push((name.to_string(), value.to_string())),
    }
}

fn with_query(path: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{path}?{query}")
}
