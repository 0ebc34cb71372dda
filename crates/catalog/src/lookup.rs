use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use movequote_core::ItemId;

use crate::item::CatalogItem;

/// Backend failure during a catalog lookup (storage unreachable, corrupt
/// record). An absent item is *not* a failure; it is `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("catalog lookup failed: {0}")]
pub struct LookupFailure(pub String);

/// Read seam for resolving an item id to its catalog record.
///
/// Pure read, no side effects. `Ok(None)` is the expected, recoverable
/// not-found condition surfaced to the caller.
#[async_trait]
pub trait ItemLookup: Send + Sync {
    async fn find(&self, id: ItemId) -> Result<Option<CatalogItem>, LookupFailure>;
}

#[async_trait]
impl<S> ItemLookup for Arc<S>
where
    S: ItemLookup + ?Sized,
{
    async fn find(&self, id: ItemId) -> Result<Option<CatalogItem>, LookupFailure> {
        (**self).find(id).await
    }
}
