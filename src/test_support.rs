use async_trait::async_trait;

use crate::domain::buyer::UserId;
use crate::domain::currency::Currency;
use crate::domain::notification::{Notification, NotificationId, NotificationRepository};
use crate::domain::order::DeliveryAddress;
use crate::domain::persistence::StoreError;
use crate::domain::product::Product;

pub fn test_address() -> DeliveryAddress {
    DeliveryAddress {
        street: "Av. Corrientes".to_string(),
        number: 1234,
        postal_code: "C1043".to_string(),
        city: "Buenos Aires".to_string(),
        province: "CABA".to_string(),
        country: "Argentina".to_string(),
        floor: Some(3),
        unit: Some("B".to_string()),
        lat: None,
        lon: None,
    }
}

pub fn test_product(price: f64, currency: Currency, stock: u32) -> Product {
    Product::new("Test product", price, currency, stock)
}

/// Notification store that is always down
pub struct UnavailableNotifications;

fn offline() -> StoreError {
    StoreError::Unavailable("notifications offline".to_string())
}

#[async_trait]
impl NotificationRepository for UnavailableNotifications {
    async fn create(&self, _notification: Notification) -> Result<Notification, StoreError> {
        Err(offline())
    }

    async fn find_for_recipient(
        &self,
        _key: &str,
        _resolved: Option<UserId>,
        _read: bool,
    ) -> Result<Vec<Notification>, StoreError> {
        Err(offline())
    }

    async fn mark_read(&self, _id: &NotificationId) -> Result<Option<Notification>, StoreError> {
        Err(offline())
    }

    async fn mark_all_read(
        &self,
        _key: &str,
        _resolved: Option<UserId>,
    ) -> Result<usize, StoreError> {
        Err(offline())
    }
}
