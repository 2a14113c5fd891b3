//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A Mutex-guarded, in-memory `OrderStore`. Used by the processor lifecycle tests in
// `tests/processor_lifecycle.rs` (and by `book::OrderBook`'s own unit tests indirectly,
// via the processor) so the full submit/match/place lifecycle can be exercised without
// a live Postgres instance, backed by a `HashMap` instead of a real database.
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::models::{Match, Order};

use super::{OrderStore, StoreError, StorePass};

#[derive(Default)]
struct State {
    orders_by_id: HashMap<String, Order>,
    orders_by_pk: HashMap<i64, String>,
    matches: Vec<Match>,
    next_pk: i64,
    next_match_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: seed a resting order directly into the store (and return its
    /// assigned `pk`), without going through the facade — used to set up a
    /// pre-existing counterparty for a scenario.
    pub async fn seed(&self, mut order: Order) -> Order {
        let mut state = self.state.lock().await;
        state.next_pk += 1;
        order.pk = Some(state.next_pk);
        state.orders_by_pk.insert(state.next_pk, order.id.clone());
        state.orders_by_id.insert(order.id.clone(), order.clone());
        order
    }

    pub async fn matches_for(&self, order_pk: i64) -> Vec<Match> {
        let state = self.state.lock().await;
        state
            .matches
            .iter()
            .filter(|m| m.buy_order_pk == order_pk || m.sell_order_pk == order_pk)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_order(&self, order: &Order) -> Result<Order, StoreError> {
        let mut state = self.state.lock().await;
        if state.orders_by_id.contains_key(&order.id) {
            return Err(StoreError::DuplicateId(order.id.clone()));
        }
        state.next_pk += 1;
        let pk = state.next_pk;
        let mut stored = order.clone();
        stored.pk = Some(pk);
        state.orders_by_pk.insert(pk, stored.id.clone());
        state.orders_by_id.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn load_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.orders_by_id.get(id).cloned())
    }

    async fn begin_pass(&self) -> Result<Box<dyn StorePass>, StoreError> {
        Ok(Box::new(InMemoryPass {
            state: self.state.clone(),
            updated_orders: Vec::new(),
            new_matches: Vec::new(),
        }))
    }

    async fn load_restable_orders(&self, instrument: &str) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders_by_id
            .values()
            .filter(|o| o.instrument == instrument && o.status.is_restable())
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }
}

struct InMemoryPass {
    state: Arc<Mutex<State>>,
    updated_orders: Vec<Order>,
    new_matches: Vec<Match>,
}

#[async_trait]
impl StorePass for InMemoryPass {
    async fn update_order(&mut self, order: &Order) -> Result<(), StoreError> {
        self.updated_orders.push(order.clone());
        Ok(())
    }

    async fn insert_match(&mut self, record: &Match) -> Result<Match, StoreError> {
        self.new_matches.push(record.clone());
        Ok(record.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        for order in self.updated_orders {
            state.orders_by_id.insert(order.id.clone(), order);
        }
        for mut record in self.new_matches {
            state.next_match_id += 1;
            record.id = Some(state.next_match_id);
            state.matches.push(record);
        }
        Ok(())
    }
}
