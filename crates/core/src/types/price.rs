//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify sends money as a decimal string plus an ISO 4217 currency code
//! (`{"amount": "4500.0", "currencyCode": "PKR"}`). Amounts are parsed straight
//! into [`Decimal`] so cart totals are exact; floating point is never used for
//! money.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when building prices from external data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("invalid currency code {0:?}")]
    InvalidCurrency(String),
    #[error("currency mismatch: {0} vs {1}")]
    CurrencyMismatch(CurrencyCode, CurrencyCode),
}

/// ISO 4217 currency code (three upper-case ASCII letters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Pakistani rupee, the store's home currency.
    #[must_use]
    pub fn pkr() -> Self {
        Self("PKR".to_string())
    }

    /// The three-letter code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Narrow currency symbol, for the currencies that have a well-known one.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "USD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            "INR" => Some("₹"),
            _ => None,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::pkr()
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 3 && trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(PriceError::InvalidCurrency(s.to_string()))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paisa).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a price from Shopify's wire representation.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the amount is not a decimal number or the
    /// currency code is malformed.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(amount, currency_code.parse()?))
    }

    /// Unit price multiplied by a quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code.clone())
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` if the currencies differ.
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

    /// Sum prices that must all share the first price's currency.
    ///
    /// Returns `Ok(None)` when there is nothing to sum.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` on the first differing currency.
    pub fn try_sum<'a, I>(prices: I) -> Result<Option<Self>, PriceError>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        prices.into_iter().try_fold(None, |acc: Option<Self>, price| match acc {
            None => Ok(Some(price.clone())),
            Some(total) => total.checked_add(price).map(Some),
        })
    }

    /// Format for display, e.g. `"$19.99"` or `"PKR 4,500.00"`.
    ///
    /// Always two fraction digits, midpoint rounded away from zero, with
    /// comma thousands separators.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        let grouped = group_thousands(whole);

        match self.currency_code.symbol() {
            Some(symbol) => format!("{sign}{symbol}{grouped}.{fraction}"),
            None => format!("{sign}{} {grouped}.{fraction}", self.currency_code),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn usd(amount: &str) -> Price {
        Price::parse(amount, "USD").unwrap()
    }

    #[test]
    fn test_parse_wire_amounts() {
        let price = Price::parse("4500.0", "PKR").unwrap();
        assert_eq!(price.amount, Decimal::new(4500, 0));
        assert_eq!(price.currency_code, CurrencyCode::pkr());

        assert!(matches!(
            Price::parse("abc", "PKR"),
            Err(PriceError::InvalidAmount(_))
        ));
        assert!(matches!(
            Price::parse("1.00", "RUPEE"),
            Err(PriceError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_currency_code_normalizes_case() {
        let code: CurrencyCode = "pkr".parse().unwrap();
        assert_eq!(code.code(), "PKR");
    }

    #[test]
    fn test_times_is_exact() {
        // 0.1 * 3 is not 0.3 in binary floating point
        let price = usd("0.10").times(3);
        assert_eq!(price.amount, Decimal::new(30, 2));
    }

    #[test]
    fn test_checked_add_rejects_mixed_currencies() {
        let pkr = Price::parse("10", "PKR").unwrap();
        let err = usd("10").checked_add(&pkr).unwrap_err();
        assert_eq!(
            err,
            PriceError::CurrencyMismatch("USD".parse().unwrap(), CurrencyCode::pkr())
        );
    }

    #[test]
    fn test_sum_of_prices() {
        let prices = [usd("19.99"), usd("0.01"), usd("5")];
        assert_eq!(Price::try_sum(&prices).unwrap(), Some(usd("25.00")));
        assert_eq!(Price::try_sum(&[]).unwrap(), None);

        let mixed = [usd("1"), Price::parse("1", "PKR").unwrap()];
        assert!(Price::try_sum(&mixed).is_err());
    }

    #[test]
    fn test_display_with_symbol() {
        assert_eq!(usd("19.99").display(), "$19.99");
        assert_eq!(usd("1234567.5").display(), "$1,234,567.50");
        assert_eq!(usd("0.005").display(), "$0.01");
        assert_eq!(usd("-3").display(), "-$3.00");
    }

    #[test]
    fn test_display_without_symbol() {
        let price = Price::parse("4500", "PKR").unwrap();
        assert_eq!(price.display(), "PKR 4,500.00");
        assert_eq!(Price::zero(CurrencyCode::pkr()).to_string(), "PKR 0.00");
    }

    #[test]
    fn test_serde_roundtrip_uses_strings() {
        let price = Price::parse("12.50", "EUR").unwrap();
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["amount"], "12.50");
        assert_eq!(json["currency_code"], "EUR");
    }
}
