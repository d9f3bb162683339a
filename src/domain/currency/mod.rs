// ============================================================================
// Currency Domain - Closed currency set and fixed-rate conversion
// ============================================================================
//
// - Value objects (Currency)
// - Errors (CurrencyError)
// - Converter (ExchangeRates, CurrencyConverter)
//
// Rates are static configuration injected at construction. There is no
// module-level rate state.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod converter;

pub use value_objects::*;
pub use errors::*;
pub use converter::*;
