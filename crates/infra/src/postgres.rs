//! Postgres-backed order store.
//!
//! One row per order plus child tables for the item snapshots. Every write of
//! an aggregate replaces its child rows, so the row set always mirrors the
//! in-memory aggregate. The partial unique index on open orders turns the
//! "one open order per user" read-then-write check into a real constraint;
//! a unique violation on insert surfaces as `DuplicateOpenOrder`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use mesa_core::{AddressId, Money, OrderId, UserId};
use mesa_orders::{
    AdditionalItem, DeliveryType, LineItem, Order, OrderStatus, OrderStore, PaymentMethod,
    StoreError,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    delivery_type TEXT NOT NULL,
    payment_method TEXT NOT NULL,
    status TEXT NOT NULL,
    address_id UUID,
    total_cents BIGINT NOT NULL,
    total_additional_cents BIGINT NOT NULL,
    delivery_date TIMESTAMPTZ,
    status_updated_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS orders_one_open_per_user
    ON orders (user_id) WHERE delivery_date IS NULL;

CREATE TABLE IF NOT EXISTS order_items (
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    position INT NOT NULL,
    description TEXT NOT NULL,
    unit_price_cents BIGINT NOT NULL,
    quantity INT NOT NULL,
    comment TEXT,
    PRIMARY KEY (order_id, position)
);

CREATE TABLE IF NOT EXISTS order_additionals (
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    position INT NOT NULL,
    description TEXT NOT NULL,
    price_cents BIGINT NOT NULL,
    PRIMARY KEY (order_id, position)
);
"#;

pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the order schema (idempotent). Called once at startup.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        Ok(())
    }

    async fn write_children(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id.as_uuid())
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM order_additionals WHERE order_id = $1")
            .bind(order.id.as_uuid())
            .execute(&mut **tx)
            .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, description, unit_price_cents, quantity, comment)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(position as i32)
            .bind(&item.description)
            .bind(item.unit_price.cents())
            .bind(item.quantity as i32)
            .bind(item.comment.as_deref())
            .execute(&mut **tx)
            .await?;
        }

        for (position, additional) in order.additional_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_additionals (order_id, position, description, price_cents)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(position as i32)
            .bind(&additional.description)
            .bind(additional.price.cents())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    async fn load_children(
        &self,
        order_id: Uuid,
    ) -> Result<(Vec<LineItem>, Vec<AdditionalItem>), sqlx::Error> {
        let item_rows = sqlx::query(
            r#"
            SELECT description, unit_price_cents, quantity, comment
            FROM order_items WHERE order_id = $1 ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            items.push(LineItem {
                description: row.try_get("description")?,
                unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
                quantity: row.try_get::<i32, _>("quantity")? as u32,
                comment: row.try_get("comment")?,
            });
        }

        let additional_rows = sqlx::query(
            r#"
            SELECT description, price_cents
            FROM order_additionals WHERE order_id = $1 ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let mut additionals = Vec::with_capacity(additional_rows.len());
        for row in additional_rows {
            additionals.push(AdditionalItem {
                description: row.try_get("description")?,
                price: Money::from_cents(row.try_get("price_cents")?),
            });
        }

        Ok((items, additionals))
    }

    async fn hydrate(&self, row: sqlx::postgres::PgRow) -> Result<Order, StoreError> {
        let id: Uuid = row.try_get("id").map_err(backend)?;
        let delivery_type_label: String = row.try_get("delivery_type").map_err(backend)?;
        let payment_label: String = row.try_get("payment_method").map_err(backend)?;
        let status_label: String = row.try_get("status").map_err(backend)?;

        let delivery_type = DeliveryType::parse(&delivery_type_label)
            .ok_or_else(|| corrupt(id, "delivery_type", &delivery_type_label))?;
        let payment_method = PaymentMethod::parse(&payment_label)
            .ok_or_else(|| corrupt(id, "payment_method", &payment_label))?;
        let status = OrderStatus::parse(delivery_type, &status_label)
            .ok_or_else(|| corrupt(id, "status", &status_label))?;

        let (items, additional_items) = self.load_children(id).await.map_err(backend)?;

        Ok(Order {
            id: OrderId::from_uuid(id),
            user_id: UserId::from_uuid(row.try_get("user_id").map_err(backend)?),
            delivery_type,
            payment_method,
            status,
            address_id: row
                .try_get::<Option<Uuid>, _>("address_id")
                .map_err(backend)?
                .map(AddressId::from_uuid),
            items,
            additional_items,
            total_additional: Money::from_cents(
                row.try_get("total_additional_cents").map_err(backend)?,
            ),
            total: Money::from_cents(row.try_get("total_cents").map_err(backend)?),
            delivery_date: row.try_get("delivery_date").map_err(backend)?,
            status_updated_at: row.try_get("status_updated_at").map_err(backend)?,
            created_at: row.try_get("created_at").map_err(backend)?,
            updated_at: row.try_get("updated_at").map_err(backend)?,
        })
    }

    async fn hydrate_all(&self, rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<Order>, StoreError> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(orders)
    }
}

const ORDER_COLUMNS: &str = "id, user_id, delivery_type, payment_method, status, address_id, \
     total_cents, total_additional_cents, delivery_date, status_updated_at, created_at, updated_at";

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, delivery_type, payment_method, status, address_id,
                total_cents, total_additional_cents, delivery_date,
                status_updated_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.delivery_type.as_str())
        .bind(order.payment_method.as_str())
        .bind(order.status.as_str())
        .bind(order.address_id.map(|a| *a.as_uuid()))
        .bind(order.total.cents())
        .bind(order.total_additional.cents())
        .bind(order.delivery_date)
        .bind(order.status_updated_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                return Err(StoreError::DuplicateOpenOrder);
            }
            return Err(backend(e));
        }

        Self::write_children(&mut tx, order).await.map_err(backend)?;
        tx.commit().await.map_err(backend)
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = $2,
                total_cents = $3,
                total_additional_cents = $4,
                delivery_date = $5,
                status_updated_at = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.total.cents())
        .bind(order.total_additional.cents())
        .bind(order.delivery_date)
        .bind(order.status_updated_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!(
                "order {} vanished during update",
                order.id
            )));
        }

        Self::write_children(&mut tx, order).await.map_err(backend)?;
        tx.commit().await.map_err(backend)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        self.hydrate_all(rows).await
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        self.hydrate_all(rows).await
    }

    async fn find_open_for_user(&self, user_id: UserId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND delivery_date IS NULL"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_pending(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, StoreError> {
        let rows = match older_than {
            Some(threshold) => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     WHERE delivery_date IS NULL AND status_updated_at < $1 \
                     ORDER BY status_updated_at"
                ))
                .bind(threshold)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     WHERE delivery_date IS NULL ORDER BY status_updated_at"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(backend)?;

        self.hydrate_all(rows).await
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn corrupt(id: Uuid, column: &str, value: &str) -> StoreError {
    StoreError::Backend(format!("order {id}: unexpected {column} value {value:?}"))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e.as_database_error().map(|db| db.kind()),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}
