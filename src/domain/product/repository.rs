use async_trait::async_trait;

use crate::domain::persistence::StoreError;
use super::entity::{Product, ProductId};

/// Outcome of an atomic conditional stock decrement
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    /// Stock was decremented; carries the product after the update
    Reserved(Product),
    /// Stock was short; nothing was written
    Insufficient { available: u32 },
    /// The product no longer exists
    Missing,
}

/// Product lookup and stock mutation port.
///
/// `reserve_stock` must check and decrement in a single atomic step
/// (conditional update, row lock or equivalent). Two concurrent reservations
/// against the same product can never both succeed if together they exceed
/// the available stock.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// Decrement stock and increment units sold by `quantity`, only if the
    /// current stock covers it.
    async fn reserve_stock(&self, id: &ProductId, quantity: u32) -> Result<Reservation, StoreError>;

    /// Increment stock and decrement units sold by `quantity`.
    ///
    /// Returns `None` when the product no longer exists.
    async fn restore_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Option<Product>, StoreError>;
}
