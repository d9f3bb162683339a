// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each concern has its own subdirectory:
// - currency: supported currencies and cross-rate conversion
// - buyer: internal / external buyer identifiers and their resolution
// - product: catalog entries and the stock mutation port
// - order: order aggregate, state machine and the lifecycle service
// - inventory: stock reservation and release for order lines
// - notification: buyer notifications and the inbox
//
// Repository ports live next to the entity they persist; adapters live in
// `crate::store`.
//
// ============================================================================

pub mod persistence;
pub mod currency;
pub mod buyer;
pub mod product;
pub mod order;
pub mod inventory;
pub mod notification;
