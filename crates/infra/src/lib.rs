//! Infrastructure layer: stores, mail transport, image ingestion.
//!
//! Every collaborator the core depends on is behind a trait with an
//! in-memory implementation for dev/test and a real one (Postgres, SMTP,
//! HTTP CDN) selected by configuration at startup.

pub mod image;
pub mod mail;
pub mod store;

pub use image::{HttpImageIngest, ImageIngest, ImageRef, InMemoryImageIngest, IngestError};
pub use mail::{InMemoryMailTransport, SmtpMailTransport};
pub use store::{
    CatalogStore, InMemoryCatalogStore, InMemoryOrderStore, OrderListing, OrderStore,
    PostgresCatalogStore, PostgresOrderStore, StoreError, ensure_schema,
};
