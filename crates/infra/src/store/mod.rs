//! Catalog and order persistence contracts.

use async_trait::async_trait;
use thiserror::Error;

use movequote_catalog::{CatalogItem, LookupFailure};
use movequote_orders::Order;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryCatalogStore, InMemoryOrderStore};
pub use postgres::{PostgresCatalogStore, PostgresOrderStore, ensure_schema};

/// Storage operation error (infrastructure, not domain).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for LookupFailure {
    fn from(e: StoreError) -> Self {
        LookupFailure(e.to_string())
    }
}

/// Write/list access to the catalog. Read-mostly; written only by
/// item-creation. Point reads go through `movequote_catalog::ItemLookup`,
/// which every store also implements.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, item: &CatalogItem) -> Result<(), StoreError>;

    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError>;
}

/// An order re-joined to the current catalog state for display.
#[derive(Debug, Clone)]
pub struct OrderListing {
    pub order: Order,
    /// Parallel to `order.lines`: the current catalog record for each line,
    /// `None` when the referenced item no longer exists. The line's own
    /// snapshot (name, quantity, volume) is unaffected.
    pub catalog: Vec<Option<CatalogItem>>,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the order and all its line items as one atomic write: the
    /// order appears with every line or not at all.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// All orders, oldest first, with each line's catalog reference
    /// re-joined to current data where available.
    async fn list_all(&self) -> Result<Vec<OrderListing>, StoreError>;
}
