use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::currency::Currency;

// ============================================================================
// Product Entity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in the product's own currency
    pub price: f64,
    pub currency: Currency,
    pub stock_quantity: u32,
    pub units_sold: u32,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        currency: Currency,
        stock_quantity: u32,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            price,
            currency,
            stock_quantity,
            units_sold: 0,
        }
    }

    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock_quantity >= quantity
    }

    /// Take `quantity` units out of stock and count them as sold.
    ///
    /// Returns false, leaving the product untouched, when stock is short.
    pub fn take_stock(&mut self, quantity: u32) -> bool {
        if !self.has_stock_for(quantity) {
            return false;
        }
        self.stock_quantity -= quantity;
        self.units_sold = self.units_sold.saturating_add(quantity);
        true
    }

    /// Put `quantity` units back into stock and un-count them as sold
    pub fn return_stock(&mut self, quantity: u32) {
        self.stock_quantity = self.stock_quantity.saturating_add(quantity);
        self.units_sold = self.units_sold.saturating_sub(quantity);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_stock_moves_counters() {
        let mut product = Product::new("Mate", 100.0, Currency::Ars, 10);
        assert!(product.take_stock(3));
        assert_eq!(product.stock_quantity, 7);
        assert_eq!(product.units_sold, 3);
    }

    #[test]
    fn test_take_stock_refuses_shortfall() {
        let mut product = Product::new("Mate", 100.0, Currency::Ars, 2);
        assert!(!product.take_stock(3));
        assert_eq!(product.stock_quantity, 2);
        assert_eq!(product.units_sold, 0);
    }

    #[test]
    fn test_take_exactly_all_stock() {
        let mut product = Product::new("Mate", 100.0, Currency::Ars, 3);
        assert!(product.take_stock(3));
        assert_eq!(product.stock_quantity, 0);
    }

    #[test]
    fn test_return_stock_is_symmetric() {
        let mut product = Product::new("Mate", 100.0, Currency::Ars, 10);
        product.take_stock(4);
        product.return_stock(4);
        assert_eq!(product.stock_quantity, 10);
        assert_eq!(product.units_sold, 0);
    }

    #[test]
    fn test_units_sold_never_underflows() {
        let mut product = Product::new("Mate", 100.0, Currency::Ars, 0);
        product.return_stock(5);
        assert_eq!(product.stock_quantity, 5);
        assert_eq!(product.units_sold, 0);
    }
}
