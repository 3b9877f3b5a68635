//! Type-safe price representation using decimal arithmetic.
//!
//! Deserializes directly from the commerce API's `MoneyV2` shape
//! (`{"amount": "19.99", "currencyCode": "USD"}`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by price arithmetic and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("currency mismatch: {0} vs {1}")]
    CurrencyMismatch(String, String),
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub fn new(amount: Decimal, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a decimal string such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::InvalidAmount` if the string is not a decimal.
    pub fn parse(amount: &str, currency_code: impl Into<String>) -> Result<Self, PriceError> {
        let amount = amount
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(amount, currency_code))
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code.clone())
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` when the currencies differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch(
                self.currency_code.clone(),
                other.currency_code.clone(),
            ));
        }
        Ok(Self::new(
            self.amount + other.amount,
            self.currency_code.clone(),
        ))
    }

    /// Subtract a price of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` when the currencies differ.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch(
                self.currency_code.clone(),
                other.currency_code.clone(),
            ));
        }
        Ok(Self::new(
            self.amount - other.amount,
            self.currency_code.clone(),
        ))
    }

    /// Currency symbol used for display, falling back to the ISO code.
    #[must_use]
    pub fn symbol(&self) -> String {
        match self.currency_code.as_str() {
            "USD" | "CAD" | "AUD" | "NZD" => "$".to_string(),
            "EUR" => "€".to_string(),
            "GBP" => "£".to_string(),
            "JPY" => "¥".to_string(),
            other => format!("{other} "),
        }
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.symbol(), self.amount.round_dp(2))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display() {
        let price = Price::parse("19.9", "USD").unwrap();
        assert_eq!(price.display(), "$19.90");

        let price = Price::parse("5", "EUR").unwrap();
        assert_eq!(price.display(), "€5.00");

        let price = Price::parse("12.5", "SEK").unwrap();
        assert_eq!(price.display(), "SEK 12.50");
    }

    #[test]
    fn test_price_times_quantity() {
        let unit = Price::parse("12.50", "USD").unwrap();
        assert_eq!(unit.times(3), Price::parse("37.50", "USD").unwrap());
        assert_eq!(unit.times(0).amount, Decimal::ZERO);
    }

    #[test]
    fn test_price_checked_add() {
        let a = Price::parse("1.10", "USD").unwrap();
        let b = Price::parse("2.20", "USD").unwrap();
        assert_eq!(a.checked_add(&b).unwrap().display(), "$3.30");

        let c = Price::parse("2.20", "EUR").unwrap();
        assert_eq!(
            a.checked_add(&c),
            Err(PriceError::CurrencyMismatch("USD".into(), "EUR".into()))
        );
    }

    #[test]
    fn test_price_parse_invalid() {
        assert!(matches!(
            Price::parse("abc", "USD"),
            Err(PriceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_price_deserializes_money_v2() {
        let json = r#"{"amount":"24.00","currencyCode":"USD"}"#;
        let price: Price = serde_json::from_str(json).unwrap();
        assert_eq!(price.display(), "$24.00");
        assert_eq!(price.currency_code, "USD");
    }
}
