//! Session-related types.
//!
//! Nothing about a visitor is stored locally except what lives in the
//! session: the Shopify cart ID and, when signed in elsewhere, a customer
//! access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shopify customer access token as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAccessToken {
    /// The token sent to Shopify as `customerAccessToken`.
    pub access_token: String,
    /// When Shopify stops accepting the token.
    pub expires_at: DateTime<Utc>,
}

impl CustomerAccessToken {
    /// Whether the token expired before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the Shopify cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Key for the Shopify customer access token.
    pub const CUSTOMER_ACCESS_TOKEN: &str = "customer_access_token";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let token = CustomerAccessToken {
            access_token: "tok".to_string(),
            expires_at: now - Duration::minutes(1),
        };
        assert!(token.is_expired_at(now));
        assert!(!token.is_expired_at(now - Duration::hours(1)));
    }

    #[test]
    fn test_token_deserializes_from_shopify_shape() {
        let token: CustomerAccessToken = serde_json::from_value(serde_json::json!({
            "accessToken": "abc",
            "expiresAt": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(token.access_token, "abc");
    }
}
