// ============================================================================
// Inventory - Stock reservation for order lines
// ============================================================================

pub mod coordinator;

pub use coordinator::*;
