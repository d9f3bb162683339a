use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::domain::currency::Currency;
use crate::domain::order::OrderStatus;

// ============================================================================
// Metrics Module - Prometheus metrics for the order lifecycle
// ============================================================================
//
// Tracks:
// - Orders placed, by currency
// - Status transitions, by from/to status
// - Stock reservation failures, by reason
// - Notification outcomes, by event type and outcome
// - Lifecycle operation latency
//
// Exposition is left to the embedding service; `render` produces the
// Prometheus text format.
// ============================================================================

pub struct LifecycleMetrics {
    registry: Registry,

    pub orders_placed: IntCounterVec,
    pub status_transitions: IntCounterVec,
    pub reservation_failures: IntCounterVec,
    pub notifications: IntCounterVec,
    pub operation_duration: HistogramVec,
}

impl LifecycleMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let orders_placed = IntCounterVec::new(
            Opts::new("orders_placed_total", "Total orders placed"),
            &["currency"],
        )?;
        registry.register(Box::new(orders_placed.clone()))?;

        let status_transitions = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status transitions"),
            &["from_status", "to_status"],
        )?;
        registry.register(Box::new(status_transitions.clone()))?;

        let reservation_failures = IntCounterVec::new(
            Opts::new("stock_reservation_failures_total", "Orders rejected while reserving stock"),
            &["reason"],
        )?;
        registry.register(Box::new(reservation_failures.clone()))?;

        let notifications = IntCounterVec::new(
            Opts::new("order_notifications_total", "Buyer notifications by outcome"),
            &["event_type", "outcome"],
        )?;
        registry.register(Box::new(notifications.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Lifecycle operation duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            status_transitions,
            reservation_failures,
            notifications,
            operation_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_placed(&self, currency: Currency) {
        self.orders_placed.with_label_values(&[currency.code()]).inc();
    }

    pub fn record_transition(&self, from: OrderStatus, to: OrderStatus) {
        self.status_transitions.with_label_values(&[from.as_str(), to.as_str()]).inc();
    }

    pub fn record_reservation_failure(&self, reason: &str) {
        self.reservation_failures.with_label_values(&[reason]).inc();
    }

    pub fn record_notification(&self, event_type: &str, outcome: &str) {
        self.notifications.with_label_values(&[event_type, outcome]).inc();
    }

    pub fn observe_operation(&self, operation: &str, duration_secs: f64, success: bool) {
        let outcome = if success { "ok" } else { "error" };
        self.operation_duration
            .with_label_values(&[operation, outcome])
            .observe(duration_secs);
    }

    /// Prometheus text exposition of every registered metric
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = LifecycleMetrics::new().unwrap();
        metrics.record_order_placed(Currency::Usd);
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_transition() {
        let metrics = LifecycleMetrics::new().unwrap();
        metrics.record_transition(OrderStatus::Pending, OrderStatus::Confirmed);
        metrics.record_transition(OrderStatus::Pending, OrderStatus::Confirmed);

        let count = metrics
            .status_transitions
            .with_label_values(&["Pending", "Confirmed"])
            .get();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_render_text_format() {
        let metrics = LifecycleMetrics::new().unwrap();
        metrics.record_notification("OrderPlaced", "sent");
        metrics.observe_operation("create", 0.002, true);

        let text = metrics.render().unwrap();
        assert!(text.contains("order_notifications_total"));
        assert!(text.contains("event_type=\"OrderPlaced\""));
        assert!(text.contains("order_operation_duration_seconds_bucket"));
    }
}
