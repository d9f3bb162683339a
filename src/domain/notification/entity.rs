use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::buyer::UserId;
use crate::domain::order::{Order, OrderEvent, OrderId};
use super::errors::NotificationError;

// ============================================================================
// Notification Entity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Internal user the key resolved to, if any
    pub recipient: Option<UserId>,
    /// Raw key the notification was addressed to
    pub recipient_key: String,
    pub order_id: OrderId,
    pub event_type: String,
    pub message: String,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build the notification for `event` on `order`.
    ///
    /// The message is derived from the event and the short order id, so it is
    /// never empty.
    pub fn for_order(
        order: &Order,
        event: &OrderEvent,
        recipient_key: impl Into<String>,
        recipient: Option<UserId>,
    ) -> Result<Self, NotificationError> {
        let recipient_key = recipient_key.into().trim().to_string();
        if recipient_key.is_empty() {
            return Err(NotificationError::MissingRecipient { order_id: order.id() });
        }

        Ok(Self {
            id: NotificationId::new(),
            recipient,
            recipient_key,
            order_id: order.id(),
            event_type: event.event_type().to_string(),
            message: format!("Order {} {}", order.id().short(), event.describe()),
            read: false,
            read_at: None,
            created_at: Utc::now(),
        })
    }

    /// Returns false when it was already read; the first read time is kept
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.read {
            return false;
        }
        self.read = true;
        self.read_at = Some(at);
        true
    }

    /// True when `key` is the stored raw key, or `resolved` is the stored
    /// internal recipient
    pub fn is_addressed_to(&self, key: &str, resolved: Option<UserId>) -> bool {
        self.recipient_key == key.trim() || (resolved.is_some() && self.recipient == resolved)
    }
}
