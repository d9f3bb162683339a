// ============================================================================
// Currency Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurrencyError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Exchange rate for {currency} must be positive, got {rate}")]
    InvalidRate { currency: String, rate: f64 },
}
