use async_trait::async_trait;

use crate::domain::buyer::UserId;
use crate::domain::persistence::StoreError;
use super::aggregate::Order;
use super::value_objects::{OrderId, OrderStatus, StatusChange};

/// Order persistence port.
///
/// Orders are never deleted; after `create` only the status and history
/// change, through `update_status`.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> Result<Order, StoreError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders whose internal buyer reference is `buyer`
    async fn find_by_buyer(&self, buyer: &UserId) -> Result<Vec<Order>, StoreError>;

    /// Orders whose external buyer reference equals `subject`
    async fn find_by_external_buyer(&self, subject: &str) -> Result<Vec<Order>, StoreError>;

    /// Persist a new status and its full history, only if the stored status
    /// is still `expected`.
    ///
    /// Fails with `StoreError::NotFound` for an unknown id and
    /// `StoreError::Conflict` when the stored status differs from `expected`
    /// or the history does not extend the stored one. The check and the write
    /// must be one atomic step.
    async fn update_status(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        history: Vec<StatusChange>,
    ) -> Result<Order, StoreError>;
}
