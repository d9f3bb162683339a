use serde::Serialize;
use std::sync::Arc;

use crate::domain::buyer::{IdentityResolver, UserId};
use crate::domain::order::{Order, OrderEvent};
use super::entity::{Notification, NotificationId};
use super::errors::NotificationError;
use super::repository::NotificationRepository;

// ============================================================================
// Notifier - Builds and persists buyer notifications
// ============================================================================
//
// Recipient key: the buyer's external subject when present, otherwise the
// internal id. The key is resolved to an internal user through the identity
// resolver; an unresolved key still produces a notification, addressed by
// key only.
//
// ============================================================================

/// What happened to the notification of a lifecycle step.
///
/// A lifecycle step that committed its state change always succeeds; this
/// reports the notification side separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent(NotificationId),
    Failed(String),
    /// The event does not notify the buyer
    Skipped,
}

impl NotificationStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationStatus::Sent(_))
    }

    /// Label for logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            NotificationStatus::Sent(_) => "sent",
            NotificationStatus::Failed(_) => "failed",
            NotificationStatus::Skipped => "skipped",
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    notifications: Arc<dyn NotificationRepository>,
    identity: Arc<dyn IdentityResolver>,
}

impl Notifier {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self { notifications, identity }
    }

    /// Notify the buyer of `order` about `event`, never failing.
    pub async fn dispatch(&self, order: &Order, event: &OrderEvent) -> NotificationStatus {
        if !event.notifies_buyer() {
            return NotificationStatus::Skipped;
        }

        match self.notify(order, event).await {
            Ok(notification) => {
                tracing::debug!(
                    order_id = %order.id(),
                    notification_id = %notification.id,
                    event_type = event.event_type(),
                    "Notification stored"
                );
                NotificationStatus::Sent(notification.id)
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id(),
                    buyer = %order.buyer(),
                    event_type = event.event_type(),
                    error = %e,
                    "Notification failed, order change stands"
                );
                NotificationStatus::Failed(e.to_string())
            }
        }
    }

    /// Build and persist the notification, propagating failures
    pub async fn notify(
        &self,
        order: &Order,
        event: &OrderEvent,
    ) -> Result<Notification, NotificationError> {
        let key = order
            .buyer()
            .notification_key()
            .ok_or(NotificationError::MissingRecipient { order_id: order.id() })?;
        let recipient = self.resolve(order, &key).await;

        let notification = Notification::for_order(order, event, key, recipient)?;
        Ok(self.notifications.create(notification).await?)
    }

    async fn resolve(&self, order: &Order, key: &str) -> Option<UserId> {
        match self.identity.resolve_internal_ref(key).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::warn!(
                    order_id = %order.id(),
                    recipient_key = key,
                    "Recipient not resolved to an internal user, addressing by key"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %order.id(),
                    recipient_key = key,
                    error = %e,
                    "Identity lookup failed, addressing by key"
                );
                None
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
