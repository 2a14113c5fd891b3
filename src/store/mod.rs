//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The durable order store: transactional persistence of orders and executed matches.
// `OrderStore` is a trait so the processor and facade depend on an abstraction rather
// than on Postgres directly — `PgOrderStore` is the production implementation,
// `InMemoryOrderStore` backs the processor lifecycle tests in `tests/`.
//
// | Type              | Description                                                       |
// |-------------------|--------------------------------------------------------------------|
// | OrderStore        | Trait: insert/load/update orders, insert matches, one pass = one tx|
// | StoreError        | DuplicateId, NotFound, Backend(...)                                |
// | PgOrderStore      | sqlx::PgPool-backed implementation                                 |
// | InMemoryOrderStore| Mutex-guarded Vec-backed implementation, for tests                 |
//--------------------------------------------------------------------------------------------------

pub mod memory;
pub mod postgres;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{Match, Order};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an order with id {0} already exists")]
    DuplicateId(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A single pass's worth of store operations, scoped to one logical transaction: all
/// mutations made through a `StorePass` commit together via `commit`, or are discarded
/// by dropping it without calling `commit`.
#[async_trait]
pub trait StorePass: Send {
    async fn update_order(&mut self, order: &Order) -> Result<(), StoreError>;
    async fn insert_match(&mut self, record: &Match) -> Result<Match, StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order. Fails with `DuplicateId` if `order.id` is already taken.
    async fn insert_order(&self, order: &Order) -> Result<Order, StoreError>;

    /// Returns the current durable state of `id`, or `None` if it doesn't exist.
    async fn load_order(&self, id: &str) -> Result<Option<Order>, StoreError>;

    /// Opens a transactional pass over the store, used for one processor dequeue.
    async fn begin_pass(&self) -> Result<Box<dyn StorePass>, StoreError>;

    /// Loads every order for `instrument` that is not yet terminal, ordered by
    /// `created_at`, to rebuild the in-memory book.
    async fn load_restable_orders(&self, instrument: &str) -> Result<Vec<Order>, StoreError>;
}
