//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error renders the same fallback page: "Oops", the status code and a
//! message safe to show shoppers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cart::CartActionError;
use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// A cart form could not be handled.
    #[error("Cart action error: {0}")]
    CartAction(#[from] CartActionError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shopify(ShopifyError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Shopify(ShopifyError::RateLimited(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::CartAction(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Render(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown on the error page.
    ///
    /// Server-side details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Shopify(ShopifyError::NotFound(_)) | Self::NotFound(_) => {
                "Sidan kunde inte hittas".to_string()
            }
            Self::Shopify(ShopifyError::RateLimited(_)) => {
                "Butiken är hårt belastad just nu, försök igen om en stund".to_string()
            }
            Self::Shopify(_) => "Ett problem uppstod med butiken".to_string(),
            Self::CartAction(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Session(_) | Self::Render(_) | Self::Internal(_) => {
                "Ett oväntat fel uppstod".to_string()
            }
        }
    }
}

/// The page-level fallback shown for every error.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let page = ErrorTemplate {
            status: status.as_u16(),
            message: self.public_message(),
        };

        (status, page).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "LinesAdd", Some(&[("cart_id", cart_id.as_str())]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("produkt skrotmagnet".to_string());
        assert_eq!(err.to_string(), "Not found: produkt skrotmagnet");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::GraphQL(vec![]))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::CartAction(CartActionError::MissingAction)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cart_action_message_is_shown() {
        let err = AppError::CartAction(CartActionError::UnhandledAction("NoteUpdate".to_string()));
        assert_eq!(
            err.public_message(),
            "NoteUpdate åtgärd för varukorgen är inte definierad"
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("db password wrong".to_string());
        assert!(!err.public_message().contains("password"));
    }

    #[test]
    fn test_error_page_renders() {
        let html = ErrorTemplate {
            status: 404,
            message: "Sidan kunde inte hittas".to_string(),
        }
        .render()
        .unwrap_or_default();
        assert!(html.contains("Oops"));
        assert!(html.contains("404"));
    }
}
