// ============================================================================
// Buyer Identity - Internal ids, external subjects and their resolution
// ============================================================================
//
// Buyers are known under two identifier spaces: the internal user id issued
// by our own user records, and the subject string issued by the external
// identity provider. `BuyerRef` carries both; `IdentityResolver` is the
// consumed capability that maps an external (or ambiguous) identifier to an
// internal user id.
//
// ============================================================================

pub mod value_objects;
pub mod resolver;

pub use value_objects::*;
pub use resolver::*;
