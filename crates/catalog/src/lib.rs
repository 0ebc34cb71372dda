//! `movequote-catalog` — the catalog of shippable items.
//!
//! Items carry physical dimensions and a volume that is computed once at
//! creation and never recomputed. The [`ItemLookup`] trait is the read seam
//! the order resolver depends on; stores and test fakes implement it.

pub mod item;
pub mod lookup;

pub use item::{CatalogItem, Dimensions, NewCatalogItem};
pub use lookup::{ItemLookup, LookupFailure};
