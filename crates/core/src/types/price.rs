//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog price.
///
/// The food service sends prices as bare JSON numbers, so the wrapper is
/// `#[serde(transparent)]` with float (de)serialization. Decimal arithmetic
/// keeps totals exact; the catalog client rejects negative prices at decode
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// A zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_from_json_number() {
        let price: Price = serde_json::from_str("129.5").unwrap();
        assert_eq!(price.amount(), Decimal::new(1295, 1));
        assert!(!price.is_negative());
    }

    #[test]
    fn test_negative_price_detected() {
        let price: Price = serde_json::from_str("-1.0").unwrap();
        assert!(price.is_negative());
    }

    #[test]
    fn test_negative_zero_is_not_negative() {
        let price = Price::new(Decimal::new(0, 0));
        assert!(!price.is_negative());
        assert_eq!(price, Price::zero());
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(4999, 2));
        assert_eq!(price.to_string(), "49.99");
    }
}
