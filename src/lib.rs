// ============================================================================
// Order Lifecycle - Order placement, status tracking and stock reservation
// ============================================================================
//
// Layout:
// - domain: currencies, buyers, products, orders, inventory, notifications
// - store: in-memory adapters for the repository ports
// - metrics: Prometheus counters and histograms for lifecycle operations
// - config: environment-driven settings
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod metrics;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{AppConfig, ConfigError};
pub use domain::order::{LineRequest, NewOrder, OrderLifecycle, OrderOutcome};
pub use metrics::LifecycleMetrics;
