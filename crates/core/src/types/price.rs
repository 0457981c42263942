//! Monetary amounts using decimal arithmetic.
//!
//! Shopify sends amounts as decimal strings (`"185.0"`) alongside an
//! ISO 4217 currency code. Amounts are kept as [`Decimal`] so nothing is
//! lost to floating point on the way to the page.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in a specific currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (dollars, not cents).
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Format with two decimal places, e.g. `$185.00`.
    #[must_use]
    pub fn display(&self) -> String {
        self.format(2)
    }

    /// Format without trailing zeros on whole amounts, e.g. `$185` but
    /// `$185.50`.
    #[must_use]
    pub fn display_compact(&self) -> String {
        if self.amount.fract().is_zero() {
            self.format(0)
        } else {
            self.format(2)
        }
    }

    fn format(&self, dp: u32) -> String {
        let rounded = self.amount.round_dp(dp).abs();
        let sign = if self.amount.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let precision = dp as usize;
        match self.currency_code.symbol() {
            Some(symbol) => format!("{sign}{symbol}{rounded:.precision$}"),
            None => format!("{sign}{rounded:.precision$} {}", self.currency_code),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency code as reported by Shopify.
///
/// Kept as a string so codes the storefront has never seen still render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Wrap a currency code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The currency code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display symbol for currencies the storefront sells in.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "USD" | "CAD" | "AUD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            _ => None,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self("USD".to_owned())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn usd(amount: &str) -> Money {
        Money::new(Decimal::from_str(amount).unwrap(), CurrencyCode::new("USD"))
    }

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(usd("185.0").display(), "$185.00");
        assert_eq!(usd("19.5").display(), "$19.50");
        assert_eq!(usd("0").display(), "$0.00");
    }

    #[test]
    fn test_display_compact_drops_whole_cents() {
        assert_eq!(usd("185.0").display_compact(), "$185");
        assert_eq!(usd("185.50").display_compact(), "$185.50");
    }

    #[test]
    fn test_display_negative_and_unknown_currency() {
        assert_eq!(usd("-5").display(), "-$5.00");
        let sek = Money::new(Decimal::from(120), CurrencyCode::new("SEK"));
        assert_eq!(sek.display(), "120.00 SEK");
    }

    #[test]
    fn test_deserialize_shopify_money() {
        let money: Money =
            serde_json::from_str(r#"{"amount":"210.0","currency_code":"EUR"}"#).unwrap();
        assert_eq!(money.display(), "€210.00");
        assert!(!money.is_zero());
    }
}
