use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::buyer::UserId;
use crate::domain::order::{Order, OrderId, OrderRepository, OrderStatus, StatusChange};
use crate::domain::persistence::StoreError;

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    async fn matching(&self, predicate: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut found: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|order| predicate(order))
            .cloned()
            .collect();
        // Newest first
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        found
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id())));
        }
        orders.insert(order.id(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn find_by_buyer(&self, buyer: &UserId) -> Result<Vec<Order>, StoreError> {
        Ok(self.matching(|order| order.buyer().internal == Some(*buyer)).await)
    }

    async fn find_by_external_buyer(&self, subject: &str) -> Result<Vec<Order>, StoreError> {
        let subject = subject.trim();
        Ok(self
            .matching(|order| order.buyer().external.as_deref() == Some(subject))
            .await)
    }

    async fn update_status(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        status: OrderStatus,
        history: Vec<StatusChange>,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(id).ok_or_else(|| StoreError::NotFound {
            entity: "Order",
            id: id.to_string(),
        })?;

        if order.status() != expected {
            return Err(StoreError::Conflict(format!(
                "order {} is {}, expected {}",
                id,
                order.status(),
                expected
            )));
        }

        order
            .sync_history(status, history)
            .map_err(|e| StoreError::Conflict(e.to_string()))?;
        Ok(order.clone())
    }
}
