//! In-memory stores for dev/test. Not optimized for performance.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use movequote_catalog::{CatalogItem, ItemLookup, LookupFailure};
use movequote_core::ItemId;
use movequote_orders::Order;

use super::{CatalogStore, OrderListing, OrderStore, StoreError};

/// In-memory catalog. Insertion order is preserved for listings.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    items: RwLock<Vec<CatalogItem>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a record. Catalog deletion is not part of the service surface;
    /// this exists to exercise dangling order references.
    pub fn remove(&self, id: ItemId) -> bool {
        let Ok(mut items) = self.items.write() else {
            return false;
        };
        let before = items.len();
        items.retain(|i| i.id != id);
        items.len() != before
    }
}

#[async_trait]
impl ItemLookup for InMemoryCatalogStore {
    async fn find(&self, id: ItemId) -> Result<Option<CatalogItem>, LookupFailure> {
        let items = self
            .items
            .read()
            .map_err(|_| LookupFailure("lock poisoned".to_string()))?;
        Ok(items.iter().find(|i| i.id == id).cloned())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, item: &CatalogItem) -> Result<(), StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        items.push(item.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(items.clone())
    }
}

/// In-memory order store. Joins listings against the injected lookup.
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    lookup: Arc<dyn ItemLookup>,
}

impl InMemoryOrderStore {
    pub fn new(lookup: Arc<dyn ItemLookup>) -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
            lookup,
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        // One push under one write lock: the order and all its lines become
        // visible together or not at all.
        let mut orders = self
            .orders
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        orders.push(order.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<OrderListing>, StoreError> {
        let orders = {
            let guard = self
                .orders
                .read()
                .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
            guard.clone()
        };

        let mut listings = Vec::with_capacity(orders.len());
        for order in orders {
            let mut catalog = Vec::with_capacity(order.lines.len());
            for line in &order.lines {
                let item = self
                    .lookup
                    .find(line.item_id)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                catalog.push(item);
            }
            listings.push(OrderListing { order, catalog });
        }
        Ok(listings)
    }
}
