use async_trait::async_trait;

use crate::domain::buyer::UserId;
use crate::domain::persistence::StoreError;
use super::entity::{Notification, NotificationId};

/// Notification persistence port.
///
/// Recipient queries match on the raw key or on the resolved internal user,
/// see `Notification::is_addressed_to`.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: Notification) -> Result<Notification, StoreError>;

    /// Notifications with the given read flag, newest first
    async fn find_for_recipient(
        &self,
        key: &str,
        resolved: Option<UserId>,
        read: bool,
    ) -> Result<Vec<Notification>, StoreError>;

    /// `None` when no notification has this id
    async fn mark_read(&self, id: &NotificationId) -> Result<Option<Notification>, StoreError>;

    /// Returns how many notifications changed from unread to read
    async fn mark_all_read(&self, key: &str, resolved: Option<UserId>) -> Result<usize, StoreError>;
}
