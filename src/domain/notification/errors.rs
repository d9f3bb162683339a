use crate::domain::order::OrderId;
use crate::domain::persistence::StoreError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotificationError {
    #[error("Order {order_id} has no buyer to notify")]
    MissingRecipient { order_id: OrderId },

    #[error("Could not store notification: {0}")]
    Store(#[from] StoreError),
}
