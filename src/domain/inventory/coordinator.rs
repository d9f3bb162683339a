use std::sync::Arc;

use crate::domain::order::{Order, OrderError, OrderId};
use crate::domain::product::{ProductId, ProductRepository, Reservation};

// ============================================================================
// Stock Coordinator
// ============================================================================
//
// Keeps product stock and units-sold counters in step with the order
// lifecycle:
//
//   place  -> reserve: one atomic conditional decrement per line
//   cancel -> release: one increment per line, missing products skipped
//
// Lines are processed one at a time, in order, so a failure is attributed to
// exactly one line. A failed reservation gives back every line this call
// already took, leaving product stock as it was before the call.
//
// ============================================================================

/// What a release did, line by line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    pub restored: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct StockCoordinator {
    products: Arc<dyn ProductRepository>,
}

impl StockCoordinator {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Reserve stock for every line of `order`
    pub async fn reserve(&self, order: &Order) -> Result<(), OrderError> {
        let mut taken: Vec<(ProductId, u32)> = Vec::with_capacity(order.items().len());

        for line in order.items() {
            let failure = match self.products.reserve_stock(&line.product_id, line.quantity).await {
                Ok(Reservation::Reserved(product)) => {
                    tracing::debug!(
                        order_id = %order.id(),
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        stock_left = product.stock_quantity,
                        "Reserved stock"
                    );
                    taken.push((line.product_id, line.quantity));
                    continue;
                }
                Ok(Reservation::Insufficient { available }) => OrderError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available,
                },
                Ok(Reservation::Missing) => OrderError::product_not_found(line.product_id),
                Err(e) => e.into(),
            };

            tracing::warn!(
                order_id = %order.id(),
                product_id = %line.product_id,
                error = %failure,
                lines_to_undo = taken.len(),
                "Stock reservation failed, giving back reserved lines"
            );
            self.give_back(order.id(), &taken).await;
            return Err(failure);
        }

        Ok(())
    }

    /// Return the stock of every line of `order`.
    ///
    /// Products deleted since the order was placed are skipped. A store
    /// failure stops the release; lines before it stay restored.
    pub async fn release(&self, order: &Order) -> Result<ReleaseReport, OrderError> {
        let mut report = ReleaseReport::default();

        for line in order.items() {
            match self.products.restore_stock(&line.product_id, line.quantity).await {
                Ok(Some(_)) => report.restored += 1,
                Ok(None) => {
                    tracing::warn!(
                        order_id = %order.id(),
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        "Product no longer exists, skipping stock restore"
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(
                        order_id = %order.id(),
                        product_id = %line.product_id,
                        restored = report.restored,
                        stage = "stock_release",
                        error = %e,
                        "Stock release interrupted, earlier lines remain restored"
                    );
                    return Err(e.into());
                }
            }
        }

        Ok(report)
    }

    /// Undo reservations already committed for `order_id`
    pub async fn give_back(&self, order_id: OrderId, taken: &[(ProductId, u32)]) {
        for (product_id, quantity) in taken {
            if let Err(e) = self.products.restore_stock(product_id, *quantity).await {
                tracing::error!(
                    order_id = %order_id,
                    product_id = %product_id,
                    quantity = quantity,
                    stage = "reservation_compensation",
                    error = %e,
                    "Could not give back reserved stock, manual reconciliation needed"
                );
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
