//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The single background consumer of the submission queue. One dequeued id drives
// exactly one pass: load, ensure book membership, match, persist, or attempt
// upstream placement with bounded retry. The processor is the sole mutator of order
// status and of the book after the facade's initial insert.
//
// | Component   | Description                                                            |
// |-------------|-------------------------------------------------------------------------|
// | Processor   | Owns the book registry and the retry-count map; runs the consume loop  |
// | ProcessorHandle | Cloneable sender used by the facade to enqueue order ids            |
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::models::order::{OrderStatus, Side};
use crate::domain::models::{Match, Order};
use crate::domain::services::matching_engine::{run_match, engine::Candidate};
use crate::domain::services::orderbook::{BookRegistry, OrderBook};
use crate::exchange::{ExchangeClient, PlacementOutcome};
use crate::store::OrderStore;

/// Handle used by the submission facade to enqueue an order id onto the processor's
/// queue. Cloning is cheap; many concurrent request handlers share one.
#[derive(Clone)]
pub struct ProcessorHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl ProcessorHandle {
    pub fn enqueue(&self, order_id: impl Into<String>) {
        let id = order_id.into();
        debug!(order_id = %id, "enqueuing order");
        // The queue is unbounded and producers never block; a send failure means the
        // processor task has shut down, which is only possible at process exit, so
        // there is nothing useful to do with the error here.
        let _ = self.tx.send(id);
    }
}

pub struct Processor<S: OrderStore, E: ExchangeClient> {
    store: Arc<S>,
    exchange: Arc<E>,
    books: BookRegistry,
    retries: HashMap<String, u32>,
    max_retries: u32,
    retry_delay: Duration,
    rx: mpsc::UnboundedReceiver<String>,
    self_tx: mpsc::UnboundedSender<String>,
}

impl<S: OrderStore + 'static, E: ExchangeClient + 'static> Processor<S, E> {
    pub fn new(
        store: Arc<S>,
        exchange: Arc<E>,
        max_retries: u32,
        retry_delay: Duration,
    ) -> (Self, ProcessorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ProcessorHandle { tx: tx.clone() };
        (
            Self {
                store,
                exchange,
                books: BookRegistry::new(),
                retries: HashMap::new(),
                max_retries,
                retry_delay,
                rx,
                self_tx: tx,
            },
            handle,
        )
    }

    /// Spawns the consume loop onto the current tokio runtime, returning a handle the
    /// facade can clone to enqueue ids and the task's `JoinHandle`.
    pub fn spawn(
        store: Arc<S>,
        exchange: Arc<E>,
        max_retries: u32,
        retry_delay: Duration,
    ) -> (ProcessorHandle, tokio::task::JoinHandle<()>) {
        let (mut processor, handle) = Self::new(store, exchange, max_retries, retry_delay);
        let join = tokio::spawn(async move { processor.run().await });
        (handle, join)
    }

    pub async fn run(&mut self) {
        while let Some(order_id) = self.rx.recv().await {
            self.process_one(&order_id).await;
        }
    }

    /// One full pass over a dequeued id: load, check status, sync book membership,
    /// demote a pending upstream submission back to open, match, and either persist
    /// the match or attempt upstream placement.
    #[tracing::instrument(skip(self), fields(order_id = %order_id))]
    async fn process_one(&mut self, order_id: &str) {
        let loaded = match self.store.load_order(order_id).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "store error loading order, dropping pass");
                self.retries.remove(order_id);
                self.books.remove_from_all(order_id);
                return;
            }
        };

        let Some(mut order) = loaded else {
            debug!("order missing from store, dropping id");
            self.retries.remove(order_id);
            self.books.remove_from_all(order_id);
            return;
        };

        if !matches!(order.status, OrderStatus::Open | OrderStatus::Submitted) {
            debug!(status = ?order.status, "order not open/submitted, dropping id");
            self.retries.remove(order_id);
            self.books.remove_from_all(order_id);
            return;
        }

        let instrument = order.instrument.clone();
        if !self.books.has_book(&instrument) {
            if let Err(e) = self.load_book(&instrument).await {
                error!(error = %e, "store error rebuilding book, rolling back pass");
                self.retries.remove(order_id);
                return;
            }
        }
        self.books.book_mut(&instrument).add(&order).ok();

        if order.status == OrderStatus::Submitted {
            // A prior upstream submission is superseded by a fresh local matching
            // attempt now that a counterparty may have arrived.
            order.status = OrderStatus::Open;
        }

        let candidate_ids = self.books.book_mut(&instrument).candidates(&order);
        let candidates = match self.load_candidates(&instrument, &candidate_ids).await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "store error loading candidates, rolling back pass");
                self.retries.remove(order_id);
                self.books.remove_from_all(order_id);
                return;
            }
        };

        let outcome = run_match(order.quantity, &candidates);

        if outcome.any_match() {
            if let Err(e) = self.apply_match(&instrument, &mut order, &outcome).await {
                error!(error = %e, "store error applying match, rolling back pass");
                self.retries.remove(order_id);
                self.books.remove_from_all(order_id);
            } else {
                self.retries.remove(order_id);
            }
            return;
        }

        self.attempt_placement(&instrument, order).await;
    }

    /// Populates the in-memory book for `instrument` from the store the first time
    /// this processor sees it — on a fresh process, nothing has been re-enqueued for
    /// orders left resting by a prior run, so the book has to be rebuilt from durable
    /// state rather than assumed empty.
    async fn load_book(&mut self, instrument: &str) -> Result<(), crate::store::StoreError> {
        let orders = self.store.load_restable_orders(instrument).await?;
        debug!(instrument, count = orders.len(), "rebuilding book from store");
        self.books.insert_book(OrderBook::rebuild(instrument, &orders));
        Ok(())
    }

    async fn load_candidates(
        &mut self,
        instrument: &str,
        ids: &[String],
    ) -> Result<Vec<Candidate>, crate::store::StoreError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.load_order(id).await? {
                Some(candidate) if candidate.status.is_restable() => out.push(Candidate {
                    order_id: candidate.id,
                    remaining_quantity: candidate.quantity,
                }),
                _ => {
                    // Stale: the book thought this id was live but the store disagrees.
                    // Trust the store and drop it from the book.
                    self.books.book_mut(instrument).remove(id);
                }
            }
        }
        Ok(out)
    }

    async fn apply_match(
        &mut self,
        instrument: &str,
        order: &mut Order,
        outcome: &crate::domain::services::matching_engine::MatchOutcome,
    ) -> Result<(), crate::store::StoreError> {
        let mut pass = self.store.begin_pass().await?;
        let now = Utc::now();

        for fill in &outcome.fills {
            let mut counterparty = self
                .store
                .load_order(&fill.counterparty_id)
                .await?
                .expect("candidate vanished mid-pass");
            counterparty.quantity = fill.counterparty_remaining;
            counterparty.status = if counterparty.quantity == 0 {
                OrderStatus::Matched
            } else {
                OrderStatus::Partial
            };

            let (buy_pk, sell_pk) = match order.side {
                Side::Buy => (
                    order.pk.expect("persisted order"),
                    counterparty.pk.expect("persisted order"),
                ),
                Side::Sell => (
                    counterparty.pk.expect("persisted order"),
                    order.pk.expect("persisted order"),
                ),
            };
            let record = Match::new(buy_pk, sell_pk, fill.quantity, now, instrument.to_string());
            pass.insert_match(&record).await?;
            pass.update_order(&counterparty).await?;

            if counterparty.status == OrderStatus::Matched {
                self.books.book_mut(instrument).remove(&counterparty.id);
            } else {
                self.books.book_mut(instrument).add(&counterparty).ok();
            }
        }

        order.quantity = outcome.remaining_quantity;
        order.status = if order.quantity == 0 {
            OrderStatus::Matched
        } else {
            OrderStatus::Partial
        };
        pass.update_order(order).await?;

        if order.status == OrderStatus::Matched {
            self.books.book_mut(instrument).remove(&order.id);
        } else {
            // A partial fill is not forwarded to the exchange in this pass; it simply
            // rests, to be reconsidered the next time a new order on this instrument
            // walks the book.
            self.books.book_mut(instrument).add(order).ok();
        }

        pass.commit().await?;
        info!(matches = outcome.fills.len(), "pass matched");
        Ok(())
    }

    async fn attempt_placement(&mut self, instrument: &str, mut order: Order) {
        match self.exchange.place_order(&order).await {
            PlacementOutcome::Ok => {
                order.status = OrderStatus::Submitted;
                if let Err(e) = self.persist(&order).await {
                    error!(error = %e, "failed to persist submitted order");
                }
                self.retries.remove(&order.id);
                info!("order submitted to exchange without local match");
            }
            PlacementOutcome::Transient(reason) => {
                let count = self.retries.get(&order.id).copied().unwrap_or(0);
                if count < self.max_retries {
                    self.retries.insert(order.id.clone(), count + 1);
                    if let Err(e) = self.persist(&order).await {
                        error!(error = %e, "failed to persist order before retry");
                        return;
                    }
                    warn!(
                        attempt = count + 1,
                        max_retries = self.max_retries,
                        reason = %reason,
                        "transient placement failure, re-enqueuing after delay"
                    );
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                    let _ = self.self_tx.send(order.id.clone());
                } else {
                    error!(reason = %reason, "transient failures exhausted, failing order");
                    order.status = OrderStatus::Failed;
                    if let Err(e) = self.persist(&order).await {
                        error!(error = %e, "failed to persist failed order");
                    }
                    self.books.book_mut(instrument).remove(&order.id);
                    self.retries.remove(&order.id);
                }
            }
            PlacementOutcome::Permanent(reason) => {
                error!(reason = %reason, "permanent placement failure, failing order");
                order.status = OrderStatus::Failed;
                if let Err(e) = self.persist(&order).await {
                    error!(error = %e, "failed to persist failed order");
                }
                self.books.book_mut(instrument).remove(&order.id);
                self.retries.remove(&order.id);
            }
        }
    }

    async fn persist(&self, order: &Order) -> Result<(), crate::store::StoreError> {
        let mut pass = self.store.begin_pass().await?;
        pass.update_order(order).await?;
        pass.commit().await
    }
}
