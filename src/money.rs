//! Money and currency types for cart arithmetic

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

/// Currencies the retail suite sells in (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    MXN,
    JPY,
}

impl Currency {
    /// Get currency code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::MXN => "MXN",
            Self::JPY => "JPY",
        }
    }

    /// Get currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD | Self::MXN => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::JPY => "¥",
        }
    }

    /// Minor-unit digits (0 for zero-decimal currencies)
    pub fn decimals(&self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }

    /// Parse from a code string
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "CAD" => Some(Self::CAD),
            "AUD" => Some(Self::AUD),
            "MXN" => Some(Self::MXN),
            "JPY" => Some(Self::JPY),
            _ => None,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::USD
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An amount in the smallest unit of its currency (cents, pence, yen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units
    pub minor: i64,
    /// Currency
    pub currency: Currency,
}

impl Money {
    /// Create from minor units
    pub fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Create from a decimal major-unit amount (e.g. 29.99)
    pub fn from_major(amount: Decimal, currency: Currency) -> Self {
        let scale = 10i64.pow(currency.decimals());
        let minor = (amount * Decimal::from(scale))
            .round()
            .to_string()
            .parse()
            .unwrap_or(0);
        Self { minor, currency }
    }

    /// USD amount from cents
    pub fn usd(cents: i64) -> Self {
        Self::new(cents, Currency::USD)
    }

    /// Amount as a decimal of major units
    pub fn to_major(&self) -> Decimal {
        Decimal::from(self.minor) / Decimal::from(10i64.pow(self.currency.decimals()))
    }

    /// Zero in the given currency
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Add, refusing cross-currency arithmetic
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        Some(Self::new(self.minor.checked_add(other.minor)?, self.currency))
    }

    /// Format for display
    pub fn format(&self) -> String {
        format!(
            "{}{:.prec$}",
            self.currency.symbol(),
            self.to_major(),
            prec = self.currency.decimals() as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        assert_eq!(self.currency, other.currency, "Currency mismatch");
        Self::new(self.minor + other.minor, self.currency)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self::new(self.minor * rhs, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_minor_units() {
        let price = Money::usd(2999);
        assert_eq!(price.minor, 2999);
        assert_eq!(price.currency, Currency::USD);
    }

    #[test]
    fn test_from_major() {
        let price = Money::from_major(Decimal::from_str("29.99").unwrap(), Currency::USD);
        assert_eq!(price.minor, 2999);

        let yen = Money::from_major(Decimal::from(1200), Currency::JPY);
        assert_eq!(yen.minor, 1200);
    }

    #[test]
    fn test_format() {
        assert_eq!(Money::usd(2999).format(), "$29.99");
        assert_eq!(Money::new(1000, Currency::JPY).format(), "¥1000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::usd(1000);
        let b = Money::usd(500);
        assert_eq!((a + b).minor, 1500);
        assert_eq!((a * 3).minor, 3000);
    }

    #[test]
    fn test_checked_add_rejects_cross_currency() {
        let usd = Money::usd(100);
        let eur = Money::new(100, Currency::EUR);
        assert!(usd.checked_add(eur).is_none());
        assert_eq!(usd.checked_add(Money::usd(23)).unwrap().minor, 123);
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::from_code("gbp"), Some(Currency::GBP));
        assert_eq!(Currency::from_code("XYZ"), None);
        assert_eq!(Currency::JPY.decimals(), 0);
    }
}
