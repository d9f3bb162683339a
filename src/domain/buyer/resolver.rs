use async_trait::async_trait;

use crate::domain::persistence::StoreError;
use super::value_objects::UserId;

// ============================================================================
// Identity Resolution Port
// ============================================================================

/// Resolves an external subject, email or raw id string to an internal user.
///
/// Implementations must treat an unknown identifier as `Ok(None)`, never as
/// an error.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_internal_ref(&self, raw: &str) -> Result<Option<UserId>, StoreError>;
}
