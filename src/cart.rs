//! Cart snapshot handed to checkout
//!
//! The cart is owned by the calling point-of-sale surface; the orchestrator
//! reads it to create a sale transaction and never mutates it.

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// One line of a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier
    pub product_id: String,
    /// Units sold
    pub quantity: u32,
    /// Per-unit price
    pub unit_price: Money,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        }
    }

    /// Line total (unit price times quantity)
    pub fn line_total(&self) -> Money {
        self.unit_price * i64::from(self.quantity)
    }
}

/// Immutable snapshot of the cart at checkout time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Line items
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the cart, taken from the first line
    pub fn currency(&self) -> Option<Currency> {
        self.items.first().map(|item| item.unit_price.currency)
    }

    /// Sum of all line totals
    pub fn total(&self) -> Money {
        let currency = self.currency().unwrap_or_default();
        self.items
            .iter()
            .fold(Money::zero(currency), |acc, item| acc + item.line_total())
    }

    /// Check the snapshot is chargeable: at least one line, positive
    /// quantities, no negative prices, a single currency throughout.
    pub fn validate(&self) -> CheckoutResult<()> {
        let Some(currency) = self.currency() else {
            return Err(CheckoutError::Validation("cart is empty".to_string()));
        };
        for item in &self.items {
            if item.quantity == 0 {
                return Err(CheckoutError::Validation(format!(
                    "zero quantity for product {}",
                    item.product_id
                )));
            }
            if item.unit_price.is_negative() {
                return Err(CheckoutError::Validation(format!(
                    "negative price for product {}",
                    item.product_id
                )));
            }
            if item.unit_price.currency != currency {
                return Err(CheckoutError::Validation(
                    "mixed currencies in cart".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> CartSnapshot {
        CartSnapshot::new(vec![
            CartItem::new("sku-1", 2, Money::usd(1050)),
            CartItem::new("sku-2", 1, Money::usd(399)),
        ])
    }

    #[test]
    fn test_totals() {
        let cart = cart();
        assert_eq!(cart.items[0].line_total().minor, 2100);
        assert_eq!(cart.total().minor, 2499);
    }

    #[test]
    fn test_validate_ok() {
        assert!(cart().validate().is_ok());
    }

    #[test]
    fn test_validate_empty() {
        let cart = CartSnapshot::new(vec![]);
        assert!(matches!(
            cart.validate(),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_zero_quantity() {
        let cart = CartSnapshot::new(vec![CartItem::new("sku-1", 0, Money::usd(100))]);
        assert!(cart.validate().is_err());
    }

    #[test]
    fn test_validate_mixed_currency() {
        let cart = CartSnapshot::new(vec![
            CartItem::new("sku-1", 1, Money::usd(100)),
            CartItem::new("sku-2", 1, Money::new(100, Currency::EUR)),
        ]);
        assert!(cart.validate().is_err());
    }
}
