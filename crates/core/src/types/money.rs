//! Monetary amounts using decimal arithmetic.
//!
//! Shopify returns amounts as decimal strings (`"1299.0"`). They are parsed
//! into [`Decimal`] so nothing is ever rounded through a float.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount with its ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in the currency's standard unit (kronor, not öre).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "SEK").
    pub currency_code: String,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Format the amount with the fractional part dropped.
    ///
    /// Swedish kronor render as `"1299 kr"`; any other currency keeps its
    /// ISO code as suffix (`"49 EUR"`).
    #[must_use]
    pub fn without_decimals(&self) -> String {
        let whole = self
            .amount
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .normalize();
        format!("{whole} {}", self.currency_suffix())
    }

    fn currency_suffix(&self) -> &str {
        if self.currency_code.eq_ignore_ascii_case("SEK") {
            "kr"
        } else {
            &self.currency_code
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.without_decimals())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn sek(amount: &str) -> Money {
        Money::new(Decimal::from_str(amount).unwrap(), "SEK")
    }

    #[test]
    fn test_without_decimals_truncates() {
        assert_eq!(sek("1299.0").without_decimals(), "1299 kr");
        assert_eq!(sek("1299.99").without_decimals(), "1299 kr");
        assert_eq!(sek("0.50").without_decimals(), "0 kr");
    }

    #[test]
    fn test_without_decimals_other_currency() {
        let money = Money::new(Decimal::from_str("49.90").unwrap(), "EUR");
        assert_eq!(money.to_string(), "49 EUR");
    }

    #[test]
    fn test_deserialize_shopify_money() {
        let money: Money =
            serde_json::from_str(r#"{"amount":"349.0","currencyCode":"SEK"}"#).unwrap();
        assert_eq!(money, sek("349"));
        assert!(!money.is_zero());
    }
}
