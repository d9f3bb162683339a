use std::sync::Arc;

use crate::domain::buyer::{IdentityResolver, UserId};
use crate::domain::order::OrderError;
use super::entity::{Notification, NotificationId};
use super::repository::NotificationRepository;

/// Read side of a buyer's notifications.
///
/// A recipient key matches notifications stored under that exact key, and
/// notifications whose resolved recipient is the user the key resolves to.
#[derive(Clone)]
pub struct NotificationInbox {
    notifications: Arc<dyn NotificationRepository>,
    identity: Arc<dyn IdentityResolver>,
}

impl NotificationInbox {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self { notifications, identity }
    }

    pub async fn unread(&self, recipient_key: &str) -> Result<Vec<Notification>, OrderError> {
        self.list(recipient_key, false).await
    }

    pub async fn read(&self, recipient_key: &str) -> Result<Vec<Notification>, OrderError> {
        self.list(recipient_key, true).await
    }

    pub async fn mark_read(&self, id: &NotificationId) -> Result<Notification, OrderError> {
        self.notifications
            .mark_read(id)
            .await?
            .ok_or_else(|| OrderError::NotFound {
                entity: "Notification",
                id: id.to_string(),
            })
    }

    pub async fn mark_all_read(&self, recipient_key: &str) -> Result<usize, OrderError> {
        let key = require_key(recipient_key)?;
        let resolved = self.resolve(key).await?;
        let marked = self.notifications.mark_all_read(key, resolved).await?;

        tracing::debug!(recipient_key = key, marked, "Marked notifications as read");
        Ok(marked)
    }

    async fn list(&self, recipient_key: &str, read: bool) -> Result<Vec<Notification>, OrderError> {
        let key = require_key(recipient_key)?;
        let resolved = self.resolve(key).await?;
        Ok(self.notifications.find_for_recipient(key, resolved, read).await?)
    }

    async fn resolve(&self, key: &str) -> Result<Option<UserId>, OrderError> {
        Ok(self.identity.resolve_internal_ref(key).await?)
    }
}

fn require_key(raw: &str) -> Result<&str, OrderError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(OrderError::Validation("recipient key is empty".to_string()));
    }
    Ok(key)
}
