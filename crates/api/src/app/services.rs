//! Service wiring: stores, mail transport, and image ingestion are selected
//! from configuration once at startup and injected into the handlers.

use std::sync::Arc;

use movequote_catalog::ItemLookup;
use movequote_infra::{
    CatalogStore, HttpImageIngest, ImageIngest, InMemoryCatalogStore, InMemoryImageIngest,
    InMemoryMailTransport, InMemoryOrderStore, OrderStore, PostgresCatalogStore,
    PostgresOrderStore, SmtpMailTransport, ensure_schema,
};
use movequote_notify::{MailTransport, Notifier};
use movequote_orders::ResolverOptions;

use crate::config::ApiConfig;

/// Everything a request handler needs, behind trait objects so tests can
/// substitute fakes.
pub struct AppServices {
    pub catalog: Arc<dyn CatalogStore>,
    pub lookup: Arc<dyn ItemLookup>,
    pub orders: Arc<dyn OrderStore>,
    pub images: Arc<dyn ImageIngest>,
    pub notifier: Notifier,
    pub resolver_options: ResolverOptions,
}

pub async fn build_services(config: &ApiConfig) -> AppServices {
    let (catalog, lookup, orders) = build_stores(config).await;

    let transport: Arc<dyn MailTransport> = match &config.smtp {
        Some(smtp) => {
            let credentials = smtp.username.clone().zip(smtp.password.clone());
            match SmtpMailTransport::new(&smtp.host, credentials) {
                Ok(t) => Arc::new(t),
                Err(e) => {
                    tracing::warn!("failed to build SMTP transport ({e}); recording email in memory");
                    Arc::new(InMemoryMailTransport::new())
                }
            }
        }
        None => {
            tracing::warn!("SMTP_HOST not set; outbound email is recorded in memory only");
            Arc::new(InMemoryMailTransport::new())
        }
    };

    let notifier = Notifier::new(
        transport,
        config.email_from.clone(),
        config.operator_email.clone(),
    );
    // One probe at startup; an unreachable transport is logged, not fatal.
    notifier.verify_transport().await;

    let images: Arc<dyn ImageIngest> = match &config.image_upload_url {
        Some(url) => Arc::new(HttpImageIngest::new(
            url.clone(),
            config.image_upload_preset.clone(),
        )),
        None => {
            tracing::warn!("IMAGE_UPLOAD_URL not set; image references are in-memory only");
            Arc::new(InMemoryImageIngest::new())
        }
    };

    AppServices {
        catalog,
        lookup,
        orders,
        images,
        notifier,
        resolver_options: config.resolver_options(),
    }
}

async fn build_stores(
    config: &ApiConfig,
) -> (Arc<dyn CatalogStore>, Arc<dyn ItemLookup>, Arc<dyn OrderStore>) {
    if config.use_persistent_stores {
        let database_url = config
            .database_url
            .clone()
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

        let pool = sqlx::PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");
        ensure_schema(&pool)
            .await
            .expect("failed to prepare database schema");

        let catalog = Arc::new(PostgresCatalogStore::new(pool.clone()));
        let orders = Arc::new(PostgresOrderStore::new(pool));
        (catalog.clone(), catalog, orders)
    } else {
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let orders = Arc::new(InMemoryOrderStore::new(catalog.clone()));
        (catalog.clone(), catalog, orders)
    }
}
