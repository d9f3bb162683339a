// ============================================================================
// Product Domain - Catalog entries referenced by orders
// ============================================================================
//
// Products are owned by catalog management. This crate only reads price and
// stock, and moves stock / units-sold counters as orders are placed and
// cancelled.
//
// ============================================================================

pub mod entity;
pub mod repository;

pub use entity::*;
pub use repository::*;
