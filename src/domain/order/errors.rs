use crate::domain::currency::CurrencyError;
use crate::domain::persistence::StoreError;
use crate::domain::product::ProductId;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Errors
// ============================================================================
//
// `Validation`, `NotFound`, `InsufficientStock`, `InvalidStateTransition` and
// `UnsupportedCurrency` are raised before any side effect, so the same
// request can be retried verbatim. `Persistence` may follow committed writes.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid order input: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(
        "Insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Cannot move order from {from} to {to}")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl OrderError {
    pub fn order_not_found(id: impl ToString) -> Self {
        OrderError::NotFound {
            entity: "Order",
            id: id.to_string(),
        }
    }

    pub fn product_not_found(id: impl ToString) -> Self {
        OrderError::NotFound {
            entity: "Product",
            id: id.to_string(),
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "validation",
            OrderError::NotFound { .. } => "not_found",
            OrderError::InsufficientStock { .. } => "insufficient_stock",
            OrderError::InvalidStateTransition { .. } => "invalid_transition",
            OrderError::UnsupportedCurrency(_) => "unsupported_currency",
            OrderError::Persistence(_) => "persistence",
        }
    }
}

impl From<CurrencyError> for OrderError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::UnsupportedCurrency(code) => OrderError::UnsupportedCurrency(code),
            CurrencyError::InvalidRate { currency, .. } => {
                OrderError::UnsupportedCurrency(currency)
            }
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => OrderError::NotFound { entity, id },
            other => OrderError::Persistence(other.to_string()),
        }
    }
}
