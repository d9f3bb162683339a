// ============================================================================
// Repository Errors
// ============================================================================
//
// Error type shared by every repository port. Adapters map their backend
// failures onto these variants; the lifecycle layer maps them onto
// `OrderError::Persistence` / `OrderError::NotFound`.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected: {0}")]
    Conflict(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}
