//! Cursor pagination over Shopify connections.
//!
//! List pages carry their position in two query parameters: `cursor` (an
//! opaque Shopify cursor) and `direction` (`next` or `previous`). Going
//! forward requests `first: N, after: cursor`; going back requests
//! `last: N, before: cursor`.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

/// Direction of travel through a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationDirection {
    #[default]
    Next,
    Previous,
}

/// Error parsing a pagination direction.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid pagination direction: {0}")]
pub struct InvalidDirection(String);

impl FromStr for PaginationDirection {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Self::Next),
            "previous" => Ok(Self::Previous),
            other => Err(InvalidDirection(other.to_string())),
        }
    }
}

/// Variables for a paginated Shopify connection query.
///
/// Exactly one of `first` and `last` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationVariables {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
}

impl PaginationVariables {
    /// The first page of `page_by` items.
    #[must_use]
    pub const fn first_page(page_by: u32) -> Self {
        Self {
            first: Some(page_by),
            last: None,
            start_cursor: None,
            end_cursor: None,
        }
    }

    /// Build variables from the `cursor` and `direction` query parameters.
    ///
    /// Unknown directions fall back to paging forward.
    #[must_use]
    pub fn from_query(cursor: Option<&str>, direction: Option<&str>, page_by: u32) -> Self {
        let cursor = cursor.filter(|c| !c.is_empty()).map(ToString::to_string);
        let direction = direction
            .and_then(|d| d.parse().ok())
            .unwrap_or_default();

        match direction {
            PaginationDirection::Previous => Self {
                first: None,
                last: Some(page_by),
                start_cursor: cursor,
                end_cursor: None,
            },
            PaginationDirection::Next => Self {
                first: Some(page_by),
                last: None,
                start_cursor: None,
                end_cursor: cursor,
            },
        }
    }
}

/// Page info returned by a Shopify connection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Link to the next page, if there is one.
    #[must_use]
    pub fn next_href(&self, path: &str) -> Option<String> {
        if !self.has_next_page {
            return None;
        }
        self.end_cursor
            .as_deref()
            .map(|cursor| page_href(path, cursor, PaginationDirection::Next))
    }

    /// Link to the previous page, if there is one.
    #[must_use]
    pub fn previous_href(&self, path: &str) -> Option<String> {
        if !self.has_previous_page {
            return None;
        }
        self.start_cursor
            .as_deref()
            .map(|cursor| page_href(path, cursor, PaginationDirection::Previous))
    }
}

fn page_href(path: &str, cursor: &str, direction: PaginationDirection) -> String {
    let direction = match direction {
        PaginationDirection::Next => "next",
        PaginationDirection::Previous => "previous",
    };
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("cursor", cursor)
        .append_pair("direction", direction)
        .finish();
    format!("{path}?{query}")
}
