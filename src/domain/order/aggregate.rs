use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::buyer::BuyerRef;
use crate::domain::currency::Currency;
use crate::domain::product::{Product, ProductId};
use super::errors::OrderError;
use super::value_objects::{DeliveryAddress, OrderId, OrderLine, OrderStatus, StatusChange};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Invariants:
// 1. `total` equals the sum of `unit_price * quantity` over `items`
// 2. `status_history` is append-only and never empty
// 3. `status` equals the status of the last history entry
// 4. Status only moves along the edges of `OrderStatus::can_transition_to`
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord")]
pub struct Order {
    // Identity
    id: OrderId,
    buyer: BuyerRef,

    // Contents
    items: Vec<OrderLine>,
    total: f64,
    currency: Currency,
    delivery_address: DeliveryAddress,

    // Lifecycle
    status: OrderStatus,
    created_at: DateTime<Utc>,
    status_history: Vec<StatusChange>,
}

impl Order {
    /// Build a new `Pending` order.
    ///
    /// The total is computed from `items`; the history starts with one
    /// `Pending` entry attributed to the buyer.
    pub fn place(
        buyer: BuyerRef,
        items: Vec<OrderLine>,
        currency: Currency,
        delivery_address: DeliveryAddress,
    ) -> Result<Self, OrderError> {
        let acting_user = buyer
            .notification_key()
            .ok_or_else(|| OrderError::Validation("buyer reference is empty".to_string()))?;
        Self::validate_items(&items)?;
        delivery_address.validate()?;

        let now = Utc::now();
        let total = Self::sum_lines(&items);

        Ok(Self {
            id: OrderId::new(),
            buyer,
            items,
            total,
            currency,
            delivery_address,
            status: OrderStatus::Pending,
            created_at: now,
            status_history: vec![StatusChange {
                at: now,
                status: OrderStatus::Pending,
                acting_user,
                reason: None,
            }],
        })
    }

    /// Validate business rules on the requested lines
    pub fn validate_items(items: &[OrderLine]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::Validation("order must contain at least one item".to_string()));
        }

        for item in items {
            if item.quantity == 0 {
                return Err(OrderError::Validation(format!(
                    "quantity for product {} must be at least 1",
                    item.product_id
                )));
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(OrderError::Validation(format!(
                    "unit price for product {} must be a non-negative number",
                    item.product_id
                )));
            }
        }

        Ok(())
    }

    fn sum_lines(items: &[OrderLine]) -> f64 {
        items.iter().fold(0.0, |acc, line| acc + line.line_total())
    }

    // ------------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------------

    /// Move to `next`, recording who did it and why.
    ///
    /// Illegal edges fail with `InvalidStateTransition` and leave the order
    /// untouched.
    pub fn transition(
        &mut self,
        next: OrderStatus,
        acting_user: impl Into<String>,
        reason: Option<String>,
    ) -> Result<StatusChange, OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }

        let change = StatusChange {
            at: Utc::now(),
            status: next,
            acting_user: acting_user.into(),
            reason: reason.filter(|r| !r.trim().is_empty()),
        };
        self.status = next;
        self.status_history.push(change.clone());

        Ok(change)
    }

    /// Check every line against current stock.
    ///
    /// Lines for the same product are summed before comparing, so an order
    /// can never claim more units of a product than exist.
    pub fn validate_stock(&self, products: &HashMap<ProductId, Product>) -> Result<(), OrderError> {
        let mut demand: HashMap<ProductId, u32> = HashMap::new();
        for line in &self.items {
            let entry = demand.entry(line.product_id).or_insert(0);
            *entry = entry.saturating_add(line.quantity);
        }

        for line in &self.items {
            let product = products
                .get(&line.product_id)
                .ok_or_else(|| OrderError::product_not_found(line.product_id))?;
            let requested = demand.get(&line.product_id).copied().unwrap_or(line.quantity);

            if !product.has_stock_for(requested) {
                return Err(OrderError::InsufficientStock {
                    product_id: line.product_id,
                    requested,
                    available: product.stock_quantity,
                });
            }
        }

        Ok(())
    }

    /// Accept a status/history pair written by a repository.
    ///
    /// The incoming history must extend the current one and end in `status`.
    pub fn sync_history(
        &mut self,
        status: OrderStatus,
        history: Vec<StatusChange>,
    ) -> Result<(), OrderError> {
        let keeps_prefix = history.len() >= self.status_history.len()
            && history[..self.status_history.len()] == self.status_history[..];
        if !keeps_prefix {
            return Err(OrderError::Validation(format!(
                "status history of order {} is append-only",
                self.id
            )));
        }

        match history.last() {
            Some(last) if last.status == status => {}
            _ => {
                return Err(OrderError::Validation(format!(
                    "status {} does not match the last history entry of order {}",
                    status, self.id
                )))
            }
        }

        self.status = status;
        self.status_history = history;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn buyer(&self) -> &BuyerRef {
        &self.buyer
    }

    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Total recomputed from the lines
    pub fn computed_total(&self) -> f64 {
        Self::sum_lines(&self.items)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn delivery_address(&self) -> &DeliveryAddress {
        &self.delivery_address
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status_history(&self) -> &[StatusChange] {
        &self.status_history
    }

    pub fn latest_change(&self) -> Option<&StatusChange> {
        self.status_history.last()
    }
}

// ============================================================================
// Loading - stored orders are re-checked against the invariants
// ============================================================================

/// Wire shape of an `Order` before validation
#[derive(Deserialize)]
struct OrderRecord {
    id: OrderId,
    buyer: BuyerRef,
    items: Vec<OrderLine>,
    total: f64,
    currency: Currency,
    delivery_address: DeliveryAddress,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    status_history: Vec<StatusChange>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = OrderError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        Order::validate_items(&record.items)?;

        let computed = Order::sum_lines(&record.items);
        if (record.total - computed).abs() > TOTAL_TOLERANCE * computed.abs().max(1.0) {
            return Err(OrderError::Validation(format!(
                "total {} of order {} does not match its lines ({})",
                record.total, record.id, computed
            )));
        }

        match record.status_history.last() {
            Some(last) if last.status == record.status => {}
            Some(_) => {
                return Err(OrderError::Validation(format!(
                    "status {} does not match the last history entry of order {}",
                    record.status, record.id
                )))
            }
            None => {
                return Err(OrderError::Validation(format!(
                    "order {} has no status history",
                    record.id
                )))
            }
        }

        Ok(Self {
            id: record.id,
            buyer: record.buyer,
            items: record.items,
            total: record.total,
            currency: record.currency,
            delivery_address: record.delivery_address,
            status: record.status,
            created_at: record.created_at,
            status_history: record.status_history,
        })
    }
}

// Relative slack for float text round trips
const TOTAL_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::buyer::UserId;
    use crate::test_support::{test_address, test_product};
    use proptest::prelude::*;

    fn create_test_order(lines: Vec<OrderLine>) -> Order {
        Order::place(
            BuyerRef::internal(UserId::new()).with_external("auth0|buyer"),
            lines,
            Currency::Ars,
            test_address(),
        )
        .unwrap()
    }

    fn single_line_order() -> Order {
        create_test_order(vec![OrderLine::new(ProductId::new(), 3, 100.0)])
    }

    #[test]
    fn test_place_starts_pending_with_one_entry() {
        let order = single_line_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.status_history().len(), 1);
        assert_eq!(order.latest_change().unwrap().status, OrderStatus::Pending);
        assert_eq!(order.latest_change().unwrap().acting_user, "auth0|buyer");
        assert_eq!(order.total(), 300.0);
    }

    #[test]
    fn test_place_rejects_empty_items() {
        let result =
            Order::place(BuyerRef::external("kc-1"), vec![], Currency::Usd, test_address());
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_place_rejects_zero_quantity() {
        let result = Order::place(
            BuyerRef::external("kc-1"),
            vec![OrderLine::new(ProductId::new(), 0, 10.0)],
            Currency::Usd,
            test_address(),
        );
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_place_rejects_negative_price() {
        let result = Order::place(
            BuyerRef::external("kc-1"),
            vec![OrderLine::new(ProductId::new(), 1, -1.0)],
            Currency::Usd,
            test_address(),
        );
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_place_requires_buyer() {
        let result = Order::place(
            BuyerRef::new(None, None),
            vec![OrderLine::new(ProductId::new(), 1, 1.0)],
            Currency::Usd,
            test_address(),
        );
        assert!(matches!(result, Err(OrderError::Validation(_))));
    }

    #[test]
    fn test_full_lifecycle_appends_history() {
        let mut order = single_line_order();
        order.transition(OrderStatus::Confirmed, "seller-1", None).unwrap();
        order.transition(OrderStatus::Shipped, "seller-1", Some("DHL".to_string())).unwrap();
        order.transition(OrderStatus::Delivered, "courier", None).unwrap();

        let statuses: Vec<_> = order.status_history().iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Shipped,
                OrderStatus::Delivered
            ]
        );
        assert_eq!(order.status_history()[2].reason.as_deref(), Some("DHL"));
    }

    #[test]
    fn test_cannot_cancel_shipped_order() {
        let mut order = single_line_order();
        order.transition(OrderStatus::Confirmed, "seller", None).unwrap();
        order.transition(OrderStatus::Shipped, "seller", None).unwrap();

        let result = order.transition(OrderStatus::Cancelled, "buyer", None);
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Cancelled
            })
        ));
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.status_history().len(), 3);
    }

    #[test]
    fn test_blank_reason_is_dropped() {
        let mut order = single_line_order();
        order.transition(OrderStatus::Cancelled, "buyer", Some("  ".to_string())).unwrap();
        assert_eq!(order.latest_change().unwrap().reason, None);
    }

    #[test]
    fn test_validate_stock_passes_with_enough_stock() {
        let product = test_product(100.0, Currency::Ars, 10);
        let order = create_test_order(vec![OrderLine::new(product.id, 10, 100.0)]);
        let products = HashMap::from([(product.id, product)]);
        assert!(order.validate_stock(&products).is_ok());
    }

    #[test]
    fn test_validate_stock_names_offending_product() {
        let plenty = test_product(1.0, Currency::Ars, 50);
        let scarce = test_product(1.0, Currency::Ars, 2);
        let order = create_test_order(vec![
            OrderLine::new(plenty.id, 5, 1.0),
            OrderLine::new(scarce.id, 3, 1.0),
        ]);
        let scarce_id = scarce.id;
        let products = HashMap::from([(plenty.id, plenty), (scarce.id, scarce)]);

        let err = order.validate_stock(&products).unwrap_err();
        assert_eq!(
            err,
            OrderError::InsufficientStock {
                product_id: scarce_id,
                requested: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_validate_stock_sums_duplicate_lines() {
        let product = test_product(1.0, Currency::Ars, 5);
        let order = create_test_order(vec![
            OrderLine::new(product.id, 3, 1.0),
            OrderLine::new(product.id, 3, 1.0),
        ]);
        let products = HashMap::from([(product.id, product)]);

        assert!(matches!(
            order.validate_stock(&products),
            Err(OrderError::InsufficientStock { requested: 6, available: 5, .. })
        ));
    }

    #[test]
    fn test_validate_stock_missing_product() {
        let order = single_line_order();
        assert!(matches!(
            order.validate_stock(&HashMap::new()),
            Err(OrderError::NotFound { entity: "Product", .. })
        ));
    }

    #[test]
    fn test_sync_history_accepts_extension() {
        let mut stored = single_line_order();
        let mut working = stored.clone();
        working.transition(OrderStatus::Confirmed, "seller", None).unwrap();

        stored
            .sync_history(working.status(), working.status_history().to_vec())
            .unwrap();
        assert_eq!(stored, working);
    }

    #[test]
    fn test_sync_history_rejects_rewrite() {
        let mut stored = single_line_order();
        stored.transition(OrderStatus::Confirmed, "seller", None).unwrap();
        let truncated = stored.status_history()[..1].to_vec();

        let result = stored.sync_history(OrderStatus::Pending, truncated);
        assert!(matches!(result, Err(OrderError::Validation(_))));
        assert_eq!(stored.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_sync_history_rejects_status_mismatch() {
        let mut stored = single_line_order();
        let history = stored.status_history().to_vec();
        assert!(stored.sync_history(OrderStatus::Shipped, history).is_err());
    }

    #[test]
    fn test_stored_order_loads_back() {
        let mut order = single_line_order();
        order.transition(OrderStatus::Confirmed, "seller", None).unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let loaded: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.id(), order.id());
        assert_eq!(loaded.status(), OrderStatus::Confirmed);
        assert_eq!(loaded.status_history().len(), 2);
    }

    #[test]
    fn test_load_rejects_tampered_total() {
        let mut value = serde_json::to_value(single_line_order()).unwrap();
        value["total"] = serde_json::json!(0.01);

        let result = serde_json::from_value::<Order>(value);
        assert!(result.unwrap_err().to_string().contains("does not match its lines"));
    }

    #[test]
    fn test_load_rejects_empty_history() {
        let mut value = serde_json::to_value(single_line_order()).unwrap();
        value["status_history"] = serde_json::json!([]);

        let result = serde_json::from_value::<Order>(value);
        assert!(result.unwrap_err().to_string().contains("no status history"));
    }

    #[test]
    fn test_load_rejects_status_ahead_of_history() {
        let mut value = serde_json::to_value(single_line_order()).unwrap();
        value["status"] = serde_json::to_value(OrderStatus::Delivered).unwrap();

        assert!(serde_json::from_value::<Order>(value).is_err());
    }

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(OrderStatus::ALL.to_vec())
    }

    /// Drive a fresh order to `target` along legal edges, if reachable
    fn order_in(target: OrderStatus) -> Option<Order> {
        let path: &[OrderStatus] = match target {
            OrderStatus::Pending => &[],
            OrderStatus::Confirmed => &[OrderStatus::Confirmed],
            OrderStatus::Shipped => &[OrderStatus::Confirmed, OrderStatus::Shipped],
            OrderStatus::Delivered => {
                &[OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered]
            }
            OrderStatus::Cancelled => &[OrderStatus::Cancelled],
            OrderStatus::InPreparation => return None,
        };
        let mut order = single_line_order();
        for status in path {
            order.transition(*status, "setup", None).ok()?;
        }
        Some(order)
    }

    proptest! {
        #[test]
        fn prop_total_matches_lines(
            lines in prop::collection::vec((1u32..50, 0.0f64..10_000.0), 1..8)
        ) {
            let items: Vec<_> = lines
                .iter()
                .map(|(qty, price)| OrderLine::new(ProductId::new(), *qty, *price))
                .collect();
            let expected = items
                .iter()
                .fold(0.0, |acc, l| acc + l.unit_price * f64::from(l.quantity));
            let order = create_test_order(items);
            prop_assert_eq!(order.total(), expected);
            prop_assert_eq!(order.total(), order.computed_total());
        }

        #[test]
        fn prop_illegal_transitions_leave_order_untouched(
            from in any_status(),
            to in any_status()
        ) {
            prop_assume!(!from.can_transition_to(to));
            if let Some(mut order) = order_in(from) {
                let before = order.clone();
                let result = order.transition(to, "anyone", None);
                prop_assert!(
                    matches!(result, Err(OrderError::InvalidStateTransition { .. })),
                    "expected InvalidStateTransition"
                );
                prop_assert_eq!(order, before);
            }
        }

        #[test]
        fn prop_history_has_one_entry_per_transition(steps in 0usize..4) {
            let path = [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered];
            let mut order = single_line_order();
            for status in path.iter().take(steps) {
                order.transition(*status, "ops", None).unwrap();
            }
            prop_assert_eq!(order.status_history().len(), steps + 1);
            prop_assert_eq!(order.latest_change().unwrap().status, order.status());
        }
    }
}
