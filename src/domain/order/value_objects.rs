use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::product::ProductId;
use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight characters, used in buyer-facing messages
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One product line of an order. Prices are in the order's currency.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderLine {
    pub fn new(product_id: ProductId, quantity: u32, unit_price: f64) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    /// Kept for stored-data compatibility; no transition enters or leaves it
    InPreparation,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InPreparation,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Confirmed, OrderStatus::Shipped)
                | (OrderStatus::Shipped, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::InPreparation => "InPreparation",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the append-only status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub at: DateTime<Utc>,
    pub status: OrderStatus,
    pub acting_user: String,
    pub reason: Option<String>,
}

/// Delivery address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub number: u32,
    pub postal_code: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub floor: Option<u32>,
    pub unit: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl DeliveryAddress {
    pub fn validate(&self) -> Result<(), OrderError> {
        let required = [
            ("street", &self.street),
            ("postal_code", &self.postal_code),
            ("city", &self.city),
            ("province", &self.province),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(OrderError::Validation(format!("delivery address {field} is empty")));
            }
        }

        if self.number == 0 {
            return Err(OrderError::Validation(
                "delivery address number must be positive".to_string(),
            ));
        }
        if self.floor == Some(0) {
            return Err(OrderError::Validation(
                "delivery address floor must be positive".to_string(),
            ));
        }

        check_len("unit", self.unit.as_deref(), 5)?;
        check_len("lat", self.lat.as_deref(), 20)?;
        check_len("lon", self.lon.as_deref(), 20)?;

        Ok(())
    }
}

fn check_len(field: &str, value: Option<&str>, max: usize) -> Result<(), OrderError> {
    match value {
        Some(v) if v.is_empty() || v.chars().count() > max => Err(OrderError::Validation(format!(
            "delivery address {field} must be 1-{max} characters"
        ))),
        _ => Ok(()),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_address;

    #[test]
    fn test_line_total() {
        let line = OrderLine::new(ProductId::new(), 3, 100.0);
        assert_eq!(line.line_total(), 300.0);
    }

    #[test]
    fn test_allowed_edges() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_forbidden_edges() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::InPreparation));
        assert!(!OrderStatus::InPreparation.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_edge_count() {
        let allowed = OrderStatus::ALL
            .iter()
            .flat_map(|from| OrderStatus::ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .count();
        assert_eq!(allowed, 5);
    }

    #[test]
    fn test_order_id_short_form() {
        let id = OrderId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().replace('-', "").starts_with(&id.short()));
    }

    #[test]
    fn test_valid_address() {
        assert!(test_address().validate().is_ok());
    }

    #[test]
    fn test_address_requires_fields() {
        let mut address = test_address();
        address.city = "  ".to_string();
        assert!(matches!(address.validate(), Err(OrderError::Validation(_))));

        let mut address = test_address();
        address.number = 0;
        assert!(address.validate().is_err());
    }

    #[test]
    fn test_address_optional_length_limits() {
        let mut address = test_address();
        address.unit = Some("TOO-LONG".to_string());
        assert!(address.validate().is_err());

        let mut address = test_address();
        address.lat = Some("-34.6037".to_string());
        address.lon = Some("-58.3816".to_string());
        assert!(address.validate().is_ok());
    }

    #[test]
    fn test_order_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::InPreparation).unwrap();
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, OrderStatus::InPreparation);
    }
}
