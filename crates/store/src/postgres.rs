use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    CatalogItem, CatalogItemId, Money, Order, OrderId, OrderLine, OrderLineId, OrderStatus,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CatalogQuery, Result, StoreError,
    store::{CatalogStore, OrderStore},
};

const MENU_ITEM_COLUMNS: &str =
    "id, name, description, price_cents, image_url, category, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, customer_name, customer_phone, customer_address, status, \
     total_cents, created_at, updated_at";

/// Lines joined to their menu item, prefixed so both sides can share a row.
const LINE_SELECT: &str = r#"
    SELECT oi.id AS line_id, oi.order_id, oi.quantity, oi.unit_price_cents, oi.menu_item_id,
           m.id, m.name, m.description, m.price_cents, m.image_url, m.category,
           m.created_at, m.updated_at
    FROM order_items oi
    JOIN menu_items m ON m.id = oi.menu_item_id
"#;

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_item(row: &PgRow) -> Result<CatalogItem> {
        Ok(CatalogItem {
            id: CatalogItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            image_url: row.try_get("image_url")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_line(row: &PgRow) -> Result<OrderLine> {
        let quantity: i32 = row.try_get("quantity")?;
        Ok(OrderLine {
            id: OrderLineId::from_uuid(row.try_get::<Uuid, _>("line_id")?),
            quantity: u32::try_from(quantity).map_err(|_| {
                StoreError::InvalidRecord(format!("negative line quantity {quantity}"))
            })?,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            menu_item_id: CatalogItemId::from_uuid(row.try_get::<Uuid, _>("menu_item_id")?),
            menu_item: Some(Self::row_to_item(row)?),
        })
    }

    fn row_to_order(row: &PgRow, lines: Vec<OrderLine>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            customer_address: row.try_get("customer_address")?,
            status: status
                .parse()
                .map_err(|e: common::ParseStatusError| StoreError::InvalidRecord(e.to_string()))?,
            total_amount: Money::from_cents(row.try_get("total_cents")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            lines,
        })
    }

    /// Loads the hydrated lines of every order in `order_ids`, grouped by order.
    async fn lines_for(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderLine>>> {
        let rows = sqlx::query(&format!(
            "{LINE_SELECT} WHERE oi.order_id = ANY($1) ORDER BY oi.order_id, oi.position ASC"
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in &rows {
            let order_id: Uuid = row.try_get("order_id")?;
            grouped
                .entry(order_id)
                .or_default()
                .push(Self::row_to_line(row)?);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_items(&self, query: CatalogQuery) -> Result<Vec<CatalogItem>> {
        let rows = match query.category {
            Some(category) => {
                sqlx::query(&format!(
                    "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE category = $1 \
                     ORDER BY category ASC, name ASC"
                ))
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {MENU_ITEM_COLUMNS} FROM menu_items ORDER BY category ASC, name ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn get_item(&self, id: CatalogItemId) -> Result<Option<CatalogItem>> {
        let row = sqlx::query(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn get_items_by_ids(&self, ids: &[CatalogItemId]) -> Result<Vec<CatalogItem>> {
        let uuids: Vec<Uuid> = ids.iter().map(CatalogItemId::as_uuid).collect();
        let rows = sqlx::query(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn save_item(&self, item: CatalogItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name, description, price_cents, image_url, category, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price_cents = EXCLUDED.price_cents,
                image_url = EXCLUDED.image_url,
                category = EXCLUDED.category,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price.cents())
        .bind(&item.image_url)
        .bind(&item.category)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_items(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        // Start a transaction
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_name, customer_phone, customer_address, status, total_cents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.customer_address)
        .bind(order.status.as_str())
        .bind(order.total_amount.cents())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_pkey")
            {
                return StoreError::DuplicateOrder(order.id);
            }
            StoreError::Database(e)
        })?;

        // Insert all lines
        for (position, line) in order.lines.iter().enumerate() {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                StoreError::InvalidRecord(format!("line quantity {} out of range", line.quantity))
            })?;

            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, menu_item_id, quantity, unit_price_cents, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(line.id.as_uuid())
            .bind(order.id.as_uuid())
            .bind(line.menu_item_id.as_uuid())
            .bind(quantity)
            .bind(line.unit_price.cents())
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(order_id = %order.id, lines = order.lines.len(), "order persisted");
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let Some(row) = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut lines = self.lines_for(&[id.as_uuid()]).await?;
        let order = Self::row_to_order(&row, lines.remove(&id.as_uuid()).unwrap_or_default())?;
        Ok(Some(order))
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut lines = self.lines_for(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| Self::row_to_order(row, lines.remove(&id).unwrap_or_default()))
            .collect()
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing matched: either the order is gone or its status moved on.
        let actual: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match actual {
            None => Err(StoreError::OrderNotFound(id)),
            Some(status) => Err(StoreError::StatusConflict {
                order_id: id,
                expected,
                actual: status
                    .parse()
                    .map_err(|e: common::ParseStatusError| StoreError::InvalidRecord(e.to_string()))?,
            }),
        }
    }
}
