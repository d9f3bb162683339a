// ============================================================================
// Store - In-memory repository adapters
// ============================================================================
//
// Implement every repository port of the domain layer over
// `tokio::sync::RwLock`-guarded maps. Used by the demo binary and tests;
// a database-backed deployment provides its own adapters for the same ports.
//
// ============================================================================

pub mod products;
pub mod orders;
pub mod notifications;
pub mod identity;

pub use products::InMemoryProductStore;
pub use orders::InMemoryOrderStore;
pub use notifications::InMemoryNotificationStore;
pub use identity::InMemoryIdentityDirectory;
