//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// `sqlx::PgPool`-backed `OrderStore`. Schema lives in `migrations/0001_init.sql` and is
// applied with `sqlx::migrate!` from `src/bin/main.rs` at startup.
//
// Queries are written against the runtime-checked `sqlx::query`/`query_as` API rather
// than the `query!` macros, since the macros need a live database at compile time to
// verify column types and this crate must build without one available.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use crate::domain::models::order::{OrderStatus, OrderType, Side};
use crate::domain::models::{Match, Order};

use super::{OrderStore, StoreError, StorePass};

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn order_type_to_str(t: OrderType) -> &'static str {
    match t {
        OrderType::Market => "MARKET",
        OrderType::Limit => "LIMIT",
    }
}

fn order_type_from_str(s: &str) -> Result<OrderType, StoreError> {
    match s {
        "MARKET" => Ok(OrderType::Market),
        "LIMIT" => Ok(OrderType::Limit),
        other => Err(StoreError::Backend(format!("unknown order_type {other}"))),
    }
}

fn side_to_str(s: Side) -> &'static str {
    match s {
        Side::Buy => "BUY",
        Side::Sell => "SELL",
    }
}

fn side_from_str(s: &str) -> Result<Side, StoreError> {
    match s {
        "BUY" => Ok(Side::Buy),
        "SELL" => Ok(Side::Sell),
        other => Err(StoreError::Backend(format!("unknown side {other}"))),
    }
}

fn status_to_str(s: OrderStatus) -> &'static str {
    match s {
        OrderStatus::Open => "OPEN",
        OrderStatus::Submitted => "SUBMITTED",
        OrderStatus::Partial => "PARTIAL",
        OrderStatus::Matched => "MATCHED",
        OrderStatus::Failed => "FAILED",
    }
}

fn status_from_str(s: &str) -> Result<OrderStatus, StoreError> {
    match s {
        "OPEN" => Ok(OrderStatus::Open),
        "SUBMITTED" => Ok(OrderStatus::Submitted),
        "PARTIAL" => Ok(OrderStatus::Partial),
        "MATCHED" => Ok(OrderStatus::Matched),
        "FAILED" => Ok(OrderStatus::Failed),
        other => Err(StoreError::Backend(format!("unknown status {other}"))),
    }
}

fn row_to_order(row: &sqlx::postgres::PgRow) -> Result<Order, StoreError> {
    Ok(Order {
        pk: Some(row.try_get::<i64, _>("id").map_err(db_err)?),
        id: row.try_get::<String, _>("order_id").map_err(db_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
        order_type: order_type_from_str(&row.try_get::<String, _>("order_type").map_err(db_err)?)?,
        side: side_from_str(&row.try_get::<String, _>("side").map_err(db_err)?)?,
        instrument: row.try_get::<String, _>("instrument").map_err(db_err)?,
        limit_price: row
            .try_get::<Option<Decimal>, _>("limit_price")
            .map_err(db_err)?,
        quantity: row.try_get::<i64, _>("quantity").map_err(db_err)?,
        status: status_from_str(&row.try_get::<String, _>("status").map_err(db_err)?)?,
    })
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert_order(&self, order: &Order) -> Result<Order, StoreError> {
        let existing = sqlx::query("SELECT 1 FROM orders WHERE order_id = $1")
            .bind(&order.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(StoreError::DuplicateId(order.id.clone()));
        }

        let row = sqlx::query(
            "INSERT INTO orders (order_id, created_at, order_type, side, instrument, limit_price, quantity, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&order.id)
        .bind(order.created_at)
        .bind(order_type_to_str(order.order_type))
        .bind(side_to_str(order.side))
        .bind(&order.instrument)
        .bind(order.limit_price)
        .bind(order.quantity)
        .bind(status_to_str(order.status))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some("orders_order_id_key") => {
                StoreError::DuplicateId(order.id.clone())
            }
            _ => db_err(e),
        })?;

        row_to_order(&row)
    }

    async fn load_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query("SELECT * FROM orders WHERE order_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(row_to_order).transpose()
    }

    async fn begin_pass(&self) -> Result<Box<dyn StorePass>, StoreError> {
        let tx = self.pool.begin().await.map_err(db_err)?;
        Ok(Box::new(PgPass { tx: Some(tx) }))
    }

    async fn load_restable_orders(&self, instrument: &str) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE instrument = $1 AND status IN ('OPEN', 'SUBMITTED', 'PARTIAL') \
             ORDER BY created_at ASC",
        )
        .bind(instrument)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(row_to_order).collect()
    }
}

struct PgPass {
    tx: Option<sqlx::Transaction<'static, sqlx::Postgres>>,
}

#[async_trait]
impl StorePass for PgPass {
    async fn update_order(&mut self, order: &Order) -> Result<(), StoreError> {
        let tx = self.tx.as_mut().expect("pass already committed");
        sqlx::query("UPDATE orders SET quantity = $1, status = $2 WHERE order_id = $3")
            .bind(order.quantity)
            .bind(status_to_str(order.status))
            .bind(&order.id)
            .execute(&mut **tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_match(&mut self, record: &Match) -> Result<Match, StoreError> {
        let tx = self.tx.as_mut().expect("pass already committed");
        let row = sqlx::query(
            "INSERT INTO matches (buy_order_id, sell_order_id, matched_quantity, matched_at, instrument) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(record.buy_order_pk)
        .bind(record.sell_order_pk)
        .bind(record.matched_quantity)
        .bind(record.matched_at)
        .bind(&record.instrument)
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)?;

        let mut saved = record.clone();
        saved.id = Some(row.try_get::<i64, _>("id").map_err(db_err)?);
        Ok(saved)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        let tx = self.tx.take().expect("pass already committed");
        tx.commit().await.map_err(db_err)
    }
}
