use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::buyer::{BuyerRef, IdentityResolver};
use crate::domain::currency::{Currency, CurrencyConverter};
use crate::domain::inventory::StockCoordinator;
use crate::domain::notification::{NotificationRepository, NotificationStatus, Notifier};
use crate::domain::persistence::StoreError;
use crate::domain::product::{Product, ProductId, ProductRepository};
use crate::metrics::LifecycleMetrics;
use super::aggregate::Order;
use super::errors::OrderError;
use super::events::OrderEvent;
use super::repository::OrderRepository;
use super::value_objects::{DeliveryAddress, OrderId, OrderLine, OrderStatus};

// ============================================================================
// Order Lifecycle Service
// ============================================================================
//
// Orchestrates: Request → Order aggregate → Stock → Order store → Notification
//
// Ordering within one call:
//   1. input validation (no side effects)
//   2. stock reservation (atomic per line, given back if a later line fails)
//   3. order persistence (reservations released if this fails)
//   4. buyer notification (best effort, reported in `OrderOutcome`)
//
// Status changes write first, conditional on the status that was read, and
// only a stored cancellation gives stock back.
//
// ============================================================================

/// Requested line; the unit price comes from the product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl LineRequest {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self { product_id, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub buyer: BuyerRef,
    pub items: Vec<LineRequest>,
    pub currency: Currency,
    pub delivery_address: DeliveryAddress,
}

impl NewOrder {
    fn validate(&self) -> Result<(), OrderError> {
        if self.buyer.is_empty() {
            return Err(OrderError::Validation("buyer reference is empty".to_string()));
        }
        if self.items.is_empty() {
            return Err(OrderError::Validation("order must contain at least one item".to_string()));
        }
        if let Some(line) = self.items.iter().find(|l| l.quantity == 0) {
            return Err(OrderError::Validation(format!(
                "quantity for product {} must be at least 1",
                line.product_id
            )));
        }
        self.delivery_address.validate()
    }
}

/// Result of a lifecycle step that committed its state change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderOutcome {
    pub order: Order,
    pub notification: NotificationStatus,
}

pub struct OrderLifecycle {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
    identity: Arc<dyn IdentityResolver>,
    converter: CurrencyConverter,
    stock: StockCoordinator,
    notifier: Notifier,
    metrics: Arc<LifecycleMetrics>,
}

impl OrderLifecycle {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        notifications: Arc<dyn NotificationRepository>,
        identity: Arc<dyn IdentityResolver>,
        converter: CurrencyConverter,
        metrics: Arc<LifecycleMetrics>,
    ) -> Self {
        Self {
            stock: StockCoordinator::new(products.clone()),
            notifier: Notifier::new(notifications, identity.clone()),
            products,
            orders,
            identity,
            converter,
            metrics,
        }
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    pub async fn create(&self, request: NewOrder) -> Result<OrderOutcome, OrderError> {
        let started = Instant::now();
        let result = self.place(request).await;
        self.observe("create", started, &result);
        result
    }

    pub async fn confirm(
        &self,
        order_id: &OrderId,
        acting_user: &str,
        reason: Option<String>,
    ) -> Result<OrderOutcome, OrderError> {
        let started = Instant::now();
        let result = self.advance(order_id, OrderStatus::Confirmed, acting_user, reason).await;
        self.observe("confirm", started, &result);
        result
    }

    pub async fn ship(
        &self,
        order_id: &OrderId,
        acting_user: &str,
        reason: Option<String>,
    ) -> Result<OrderOutcome, OrderError> {
        let started = Instant::now();
        let result = self.advance(order_id, OrderStatus::Shipped, acting_user, reason).await;
        self.observe("ship", started, &result);
        result
    }

    pub async fn deliver(
        &self,
        order_id: &OrderId,
        acting_user: &str,
        reason: Option<String>,
    ) -> Result<OrderOutcome, OrderError> {
        let started = Instant::now();
        let result = self.advance(order_id, OrderStatus::Delivered, acting_user, reason).await;
        self.observe("deliver", started, &result);
        result
    }

    /// Cancel a `Pending` or `Confirmed` order and give its stock back
    pub async fn cancel(
        &self,
        order_id: &OrderId,
        acting_user: &str,
        reason: Option<String>,
    ) -> Result<OrderOutcome, OrderError> {
        let started = Instant::now();
        let result = self.advance(order_id, OrderStatus::Cancelled, acting_user, reason).await;
        self.observe("cancel", started, &result);
        result
    }

    pub async fn find(&self, order_id: &OrderId) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::order_not_found(order_id))
    }

    /// Orders placed by the buyer `raw_ref` identifies.
    ///
    /// An internal-id shaped reference is matched on the internal buyer id,
    /// then on the external subject. Anything else is matched on the external
    /// subject, then resolved to an internal id and matched again. Nothing
    /// found is an empty list.
    pub async fn history_for_buyer(&self, raw_ref: &str) -> Result<Vec<Order>, OrderError> {
        let raw = raw_ref.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(user) = BuyerRef::parse(raw).internal {
            let orders = self.orders.find_by_buyer(&user).await?;
            if !orders.is_empty() {
                return Ok(orders);
            }
            return Ok(self.orders.find_by_external_buyer(raw).await?);
        }

        let orders = self.orders.find_by_external_buyer(raw).await?;
        if !orders.is_empty() {
            return Ok(orders);
        }

        match self.identity.resolve_internal_ref(raw).await? {
            Some(user) => {
                tracing::debug!(buyer = raw, user_id = %user, "Resolved buyer for history lookup");
                Ok(self.orders.find_by_buyer(&user).await?)
            }
            None => Ok(Vec::new()),
        }
    }

    // ------------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------------

    async fn place(&self, request: NewOrder) -> Result<OrderOutcome, OrderError> {
        request.validate()?;

        let buyer = self.canonical_buyer(request.buyer).await;
        let products = self.load_products(&request.items).await?;
        let lines = self.price_lines(&request.items, &products, request.currency)?;

        let order = Order::place(buyer, lines, request.currency, request.delivery_address)?;
        if let Err(e) = order.validate_stock(&products) {
            self.metrics.record_reservation_failure(e.kind());
            return Err(e);
        }

        if let Err(e) = self.stock.reserve(&order).await {
            self.metrics.record_reservation_failure(e.kind());
            return Err(e);
        }

        let order = match self.orders.create(order.clone()).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(
                    order_id = %order.id(),
                    buyer = %order.buyer(),
                    stage = "order_persist",
                    error = %e,
                    "Order not stored, releasing reserved stock"
                );
                if let Err(release_err) = self.stock.release(&order).await {
                    tracing::error!(
                        order_id = %order.id(),
                        buyer = %order.buyer(),
                        stage = "reservation_release",
                        error = %release_err,
                        "Reserved stock could not be released, manual reconciliation needed"
                    );
                }
                return Err(OrderError::Persistence(e.to_string()));
            }
        };

        self.metrics.record_order_placed(order.currency());
        tracing::info!(
            order_id = %order.id(),
            buyer = %order.buyer(),
            total = order.total(),
            currency = %order.currency(),
            lines = order.items().len(),
            city = %order.delivery_address().city,
            "✅ Order placed"
        );

        let notification = self.notify(&order, &OrderEvent::Placed).await;
        Ok(OrderOutcome { order, notification })
    }

    async fn advance(
        &self,
        order_id: &OrderId,
        next: OrderStatus,
        acting_user: &str,
        reason: Option<String>,
    ) -> Result<OrderOutcome, OrderError> {
        let acting_user = acting_user.trim();
        if acting_user.is_empty() {
            return Err(OrderError::Validation("acting user is empty".to_string()));
        }

        let mut order = self.find(order_id).await?;
        let from = order.status();
        let change = order.transition(next, acting_user, reason)?;

        // The status write is conditional on `from`, so exactly one of two
        // racing calls moves the order and runs the stock side effect.
        let stored = match self
            .orders
            .update_status(order_id, from, order.status(), order.status_history().to_vec())
            .await
        {
            Ok(stored) => stored,
            Err(e) => return Err(self.status_write_failed(&order, from, next, e).await),
        };

        if next == OrderStatus::Cancelled {
            match self.stock.release(&stored).await {
                Ok(report) => tracing::debug!(
                    order_id = %stored.id(),
                    restored = report.restored,
                    skipped = report.skipped,
                    "Released stock for cancelled order"
                ),
                Err(e) => {
                    tracing::error!(
                        order_id = %stored.id(),
                        buyer = %stored.buyer(),
                        stage = "stock_release",
                        error = %e,
                        "Order cancelled but its stock was not fully released"
                    );
                    return Err(e);
                }
            }
        }

        self.metrics.record_transition(from, next);
        tracing::info!(
            order_id = %stored.id(),
            from = %from,
            to = %next,
            acting_user = acting_user,
            "Order status changed"
        );

        let notification = match OrderEvent::from_change(&change) {
            Some(event) => self.notify(&stored, &event).await,
            None => NotificationStatus::Skipped,
        };
        Ok(OrderOutcome { order: stored, notification })
    }

    /// Map a rejected status write. Losing to a concurrent change is reported
    /// as the transition it turned into; anything else is a persistence error.
    async fn status_write_failed(
        &self,
        order: &Order,
        from: OrderStatus,
        next: OrderStatus,
        err: StoreError,
    ) -> OrderError {
        if let StoreError::Conflict(_) = err {
            if let Ok(Some(current)) = self.orders.find_by_id(&order.id()).await {
                if current.status() != from {
                    tracing::warn!(
                        order_id = %order.id(),
                        expected = %from,
                        found = %current.status(),
                        to = %next,
                        "Order changed concurrently, status write rejected"
                    );
                    return OrderError::InvalidStateTransition {
                        from: current.status(),
                        to: next,
                    };
                }
            }
        }

        tracing::error!(
            order_id = %order.id(),
            buyer = %order.buyer(),
            stage = "status_update",
            from = %from,
            to = %next,
            error = %err,
            "Status change not stored, no stock was moved"
        );
        err.into()
    }

    /// Fill in the internal id of an externally identified buyer when the
    /// identity resolver knows it
    async fn canonical_buyer(&self, buyer: BuyerRef) -> BuyerRef {
        let external = match (&buyer.internal, &buyer.external) {
            (None, Some(external)) => external.clone(),
            _ => return buyer,
        };

        match self.identity.resolve_internal_ref(&external).await {
            Ok(Some(user)) => BuyerRef::new(Some(user), Some(external)),
            Ok(None) => buyer,
            Err(e) => {
                tracing::warn!(
                    buyer = %external,
                    error = %e,
                    "Buyer identity lookup failed, keeping external ref only"
                );
                buyer
            }
        }
    }

    async fn load_products(
        &self,
        items: &[LineRequest],
    ) -> Result<HashMap<ProductId, Product>, OrderError> {
        let mut products = HashMap::with_capacity(items.len());
        for line in items {
            if products.contains_key(&line.product_id) {
                continue;
            }
            let product = self
                .products
                .find_by_id(&line.product_id)
                .await?
                .ok_or_else(|| OrderError::product_not_found(line.product_id))?;
            products.insert(line.product_id, product);
        }
        Ok(products)
    }

    fn price_lines(
        &self,
        items: &[LineRequest],
        products: &HashMap<ProductId, Product>,
        currency: Currency,
    ) -> Result<Vec<OrderLine>, OrderError> {
        items
            .iter()
            .map(|line| {
                let product = products
                    .get(&line.product_id)
                    .ok_or_else(|| OrderError::product_not_found(line.product_id))?;
                let unit_price = self.converter.convert(product.price, product.currency, currency)?;
                Ok(OrderLine::new(line.product_id, line.quantity, unit_price))
            })
            .collect()
    }

    async fn notify(&self, order: &Order, event: &OrderEvent) -> NotificationStatus {
        let status = self.notifier.dispatch(order, event).await;
        self.metrics.record_notification(event.event_type(), status.outcome());
        status
    }

    fn observe<T>(&self, operation: &str, started: Instant, result: &Result<T, OrderError>) {
        self.metrics
            .observe_operation(operation, started.elapsed().as_secs_f64(), result.is_ok());
        if let Err(e) = result {
            tracing::debug!(operation, kind = e.kind(), error = %e, "Lifecycle operation rejected");
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
