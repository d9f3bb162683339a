// ============================================================================
// Order Domain - Lifecycle of a buyer's order
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderId, OrderLine, OrderStatus, DeliveryAddress, ...)
// - Events (OrderPlaced, OrderShipped, ...)
// - Errors (OrderError enum)
// - Aggregate (Order entity and its state machine)
// - Repository port (OrderRepository)
// - Lifecycle service (OrderLifecycle orchestrator)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod errors;
pub mod aggregate;
pub mod repository;
pub mod lifecycle;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use errors::*;
pub use aggregate::*;
pub use repository::*;
pub use lifecycle::*;
