//! Postgres-backed stores.
//!
//! The order insert runs in a single transaction covering the order row and
//! every line row, so a partially written order is never observable. Every
//! listing re-joins line references to current catalog data with a LEFT
//! JOIN; a removed catalog item simply yields NULL columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use movequote_catalog::{CatalogItem, ItemLookup, LookupFailure};
use movequote_core::{ItemId, OrderId};
use movequote_orders::{CustomerDetails, Order, OrderLineItem};

use super::{CatalogStore, OrderListing, OrderStore, StoreError};

/// Create the tables if they do not exist yet. Called once at startup when
/// persistent stores are selected.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS catalog_items (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            item_type TEXT NOT NULL,
            image_url TEXT NOT NULL,
            length DOUBLE PRECISION NOT NULL,
            height DOUBLE PRECISION NOT NULL,
            width DOUBLE PRECISION NOT NULL,
            volume DOUBLE PRECISION NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| backend("create catalog_items", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id UUID PRIMARY KEY,
            customer_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            address TEXT NOT NULL,
            message TEXT NOT NULL,
            submitted_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| backend("create orders", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS order_lines (
            order_id UUID NOT NULL REFERENCES orders(id),
            line_no INTEGER NOT NULL,
            item_id UUID NOT NULL,
            item_name TEXT NOT NULL,
            quantity BIGINT NOT NULL CHECK (quantity > 0),
            volume DOUBLE PRECISION NOT NULL,
            PRIMARY KEY (order_id, line_no)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| backend("create order_lines", e))?;

    Ok(())
}

fn backend(op: &str, e: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("{op}: {e}"))
}

fn corrupt(op: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{op}: {e}"))
}

/// Postgres catalog store.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn item_from_row(row: &PgRow) -> Result<CatalogItem, StoreError> {
    Ok(CatalogItem {
        id: ItemId::from(row.try_get::<Uuid, _>("id").map_err(|e| corrupt("catalog id", e))?),
        name: row.try_get("name").map_err(|e| corrupt("catalog name", e))?,
        item_type: row
            .try_get("item_type")
            .map_err(|e| corrupt("catalog item_type", e))?,
        image_url: row
            .try_get("image_url")
            .map_err(|e| corrupt("catalog image_url", e))?,
        length: row.try_get("length").map_err(|e| corrupt("catalog length", e))?,
        height: row.try_get("height").map_err(|e| corrupt("catalog height", e))?,
        width: row.try_get("width").map_err(|e| corrupt("catalog width", e))?,
        volume: row.try_get("volume").map_err(|e| corrupt("catalog volume", e))?,
    })
}

const SELECT_ITEM: &str =
    "SELECT id, name, item_type, image_url, length, height, width, volume FROM catalog_items";

#[async_trait]
impl ItemLookup for PostgresCatalogStore {
    #[tracing::instrument(skip(self), fields(item_id = %id))]
    async fn find(&self, id: ItemId) -> Result<Option<CatalogItem>, LookupFailure> {
        let row = sqlx::query(&format!("{SELECT_ITEM} WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LookupFailure(format!("find catalog item: {e}")))?;

        match row {
            Some(row) => Ok(Some(item_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn insert(&self, item: &CatalogItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO catalog_items (id, name, item_type, image_url, length, height, width, volume)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.item_type)
        .bind(&item.image_url)
        .bind(item.length)
        .bind(item.height)
        .bind(item.width)
        .bind(item.volume)
        .execute(&self.pool)
        .await
        .map_err(|e| backend("insert catalog item", e))?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError> {
        // UUIDv7 ids are time-ordered, so this is creation order.
        let rows = sqlx::query(&format!("{SELECT_ITEM} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend("list catalog items", e))?;

        rows.iter().map(item_from_row).collect()
    }
}

/// Postgres order store.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip_all, fields(order_id = %order.id, lines = order.lines.len()))]
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| backend("begin order insert", e))?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_name, email, phone, address, message, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*order.id.as_uuid())
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(&order.customer.message)
        .bind(order.submitted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| backend("insert order", e))?;

        for (line_no, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, line_no, item_id, item_name, quantity, volume)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(*order.id.as_uuid())
            .bind(line_no as i32)
            .bind(*line.item_id.as_uuid())
            .bind(&line.name)
            .bind(i64::from(line.quantity))
            .bind(line.volume)
            .execute(&mut *tx)
            .await
            .map_err(|e| backend("insert order line", e))?;
        }

        tx.commit().await.map_err(|e| backend("commit order insert", e))
    }

    async fn list_all(&self) -> Result<Vec<OrderListing>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                o.id AS order_id,
                o.customer_name, o.email, o.phone, o.address, o.message, o.submitted_at,
                l.item_id, l.item_name, l.quantity, l.volume,
                c.id AS cat_id,
                c.name AS cat_name,
                c.item_type AS cat_type,
                c.image_url AS cat_image_url,
                c.length AS cat_length,
                c.height AS cat_height,
                c.width AS cat_width,
                c.volume AS cat_volume
            FROM orders o
            JOIN order_lines l ON l.order_id = o.id
            LEFT JOIN catalog_items c ON c.id = l.item_id
            ORDER BY o.submitted_at, o.id, l.line_no
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("list orders", e))?;

        let mut listings: Vec<OrderListing> = Vec::new();
        for row in rows {
            let order_id: Uuid = row.try_get("order_id").map_err(|e| corrupt("order id", e))?;

            let quantity: i64 = row.try_get("quantity").map_err(|e| corrupt("line quantity", e))?;
            let line = OrderLineItem {
                item_id: ItemId::from(
                    row.try_get::<Uuid, _>("item_id")
                        .map_err(|e| corrupt("line item_id", e))?,
                ),
                name: row
                    .try_get("item_name")
                    .map_err(|e| corrupt("line item_name", e))?,
                quantity: u32::try_from(quantity)
                    .map_err(|_| StoreError::Corrupt(format!("line quantity out of range: {quantity}")))?,
                volume: row.try_get("volume").map_err(|e| corrupt("line volume", e))?,
            };

            let joined = match row
                .try_get::<Option<Uuid>, _>("cat_id")
                .map_err(|e| corrupt("joined catalog id", e))?
            {
                Some(cat_id) => Some(CatalogItem {
                    id: ItemId::from(cat_id),
                    name: row.try_get("cat_name").map_err(|e| corrupt("joined name", e))?,
                    item_type: row.try_get("cat_type").map_err(|e| corrupt("joined type", e))?,
                    image_url: row
                        .try_get("cat_image_url")
                        .map_err(|e| corrupt("joined image_url", e))?,
                    length: row
                        .try_get("cat_length")
                        .map_err(|e| corrupt("joined length", e))?,
                    height: row
                        .try_get("cat_height")
                        .map_err(|e| corrupt("joined height", e))?,
                    width: row.try_get("cat_width").map_err(|e| corrupt("joined width", e))?,
                    volume: row
                        .try_get("cat_volume")
                        .map_err(|e| corrupt("joined volume", e))?,
                }),
                None => None,
            };

            // Rows arrive grouped by order; append to the current group or
            // start a new one.
            match listings.last_mut() {
                Some(listing) if Uuid::from(listing.order.id) == order_id => {
                    listing.order.lines.push(line);
                    listing.catalog.push(joined);
                }
                _ => {
                    listings.push(OrderListing {
                        order: Order {
                            id: OrderId::from(order_id),
                            submitted_at: row
                                .try_get::<DateTime<Utc>, _>("submitted_at")
                                .map_err(|e| corrupt("order submitted_at", e))?,
                            customer: CustomerDetails {
                                name: row
                                    .try_get("customer_name")
                                    .map_err(|e| corrupt("order customer_name", e))?,
                                email: row.try_get("email").map_err(|e| corrupt("order email", e))?,
                                phone: row.try_get("phone").map_err(|e| corrupt("order phone", e))?,
                                address: row
                                    .try_get("address")
                                    .map_err(|e| corrupt("order address", e))?,
                                message: row
                                    .try_get("message")
                                    .map_err(|e| corrupt("order message", e))?,
                            },
                            lines: vec![line],
                        },
                        catalog: vec![joined],
                    });
                }
            }
        }

        Ok(listings)
    }
}
