use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::persistence::StoreError;
use crate::domain::product::{Product, ProductId, ProductRepository, Reservation};

/// Products keyed by id.
///
/// `reserve_stock` checks and decrements under one write guard, so
/// concurrent reservations against the same product are serialized.
#[derive(Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn remove(&self, id: &ProductId) -> Option<Product> {
        self.products.write().await.remove(id)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductStore {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn reserve_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Reservation, StoreError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(id) else {
            return Ok(Reservation::Missing);
        };

        if product.take_stock(quantity) {
            Ok(Reservation::Reserved(product.clone()))
        } else {
            Ok(Reservation::Insufficient {
                available: product.stock_quantity,
            })
        }
    }

    async fn restore_stock(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().await;
        Ok(products.get_mut(id).map(|product| {
            product.return_stock(quantity);
            product.clone()
        }))
    }
}
