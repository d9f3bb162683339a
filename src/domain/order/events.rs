use serde::{Deserialize, Serialize};

use super::value_objects::{OrderStatus, StatusChange};

// ============================================================================
// Order Events - Significant lifecycle moments
// ============================================================================
//
// Derived from status changes. Events drive buyer notifications and
// metrics labels; they are not persisted on their own.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Placed,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled { reason: Option<String> },
}

impl OrderEvent {
    /// Event for a recorded status change. `InPreparation` has no event.
    pub fn from_change(change: &StatusChange) -> Option<Self> {
        match change.status {
            OrderStatus::Pending => Some(OrderEvent::Placed),
            OrderStatus::Confirmed => Some(OrderEvent::Confirmed),
            OrderStatus::Shipped => Some(OrderEvent::Shipped),
            OrderStatus::Delivered => Some(OrderEvent::Delivered),
            OrderStatus::Cancelled => Some(OrderEvent::Cancelled {
                reason: change.reason.clone(),
            }),
            OrderStatus::InPreparation => None,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed => "OrderPlaced",
            OrderEvent::Confirmed => "OrderConfirmed",
            OrderEvent::Shipped => "OrderShipped",
            OrderEvent::Delivered => "OrderDelivered",
            OrderEvent::Cancelled { .. } => "OrderCancelled",
        }
    }

    /// Whether the buyer is told about this event
    pub fn notifies_buyer(&self) -> bool {
        !matches!(self, OrderEvent::Confirmed)
    }

    /// Past-tense phrase used in buyer-facing messages
    pub fn describe(&self) -> String {
        match self {
            OrderEvent::Placed => "was placed".to_string(),
            OrderEvent::Confirmed => "was confirmed".to_string(),
            OrderEvent::Shipped => "has shipped".to_string(),
            OrderEvent::Delivered => "was delivered".to_string(),
            OrderEvent::Cancelled { reason: Some(reason) } => format!("was cancelled: {reason}"),
            OrderEvent::Cancelled { reason: None } => "was cancelled".to_string(),
        }
    }
}
