use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::buyer::UserId;
use crate::domain::notification::{Notification, NotificationId, NotificationRepository};
use crate::domain::persistence::StoreError;

/// Notifications in insertion order
#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationStore {
    async fn create(&self, notification: Notification) -> Result<Notification, StoreError> {
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn find_for_recipient(
        &self,
        key: &str,
        resolved: Option<UserId>,
        read: bool,
    ) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .notifications
            .read()
            .await
            .iter()
            .rev()
            .filter(|n| n.read == read && n.is_addressed_to(key, resolved))
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<Option<Notification>, StoreError> {
        let mut notifications = self.notifications.write().await;
        Ok(notifications.iter_mut().find(|n| n.id == *id).map(|n| {
            n.mark_read(Utc::now());
            n.clone()
        }))
    }

    async fn mark_all_read(
        &self,
        key: &str,
        resolved: Option<UserId>,
    ) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut marked = 0;
        for notification in self.notifications.write().await.iter_mut() {
            if notification.is_addressed_to(key, resolved) && notification.mark_read(now) {
                marked += 1;
            }
        }
        Ok(marked)
    }
}
