//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements a limit order book for a single trading instrument, organised
// by side and by price, with strict FIFO ordering within a price level. It is a cache
// over the store, not a source of truth: it may be rebuilt at any time by reloading
// every non-terminal order for the instrument in `created_at` order (see `rebuild`).
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | BookEntry     | One resting order's book-relevant fields (id, status, created_at)         |
// | PriceLevel    | FIFO queue of entries at a single price                                   |
// | OrderBook     | bids/asks keyed by price, plus a dedicated market-order bucket per side   |
//
// Market orders are not given a synthetic "infinite" price: `Decimal` has no sentinel
// that is guaranteed to compare as more extreme than every legitimate price without
// also being a legitimate price itself (zero is a real — if degenerate — price level
// in other systems, and `Decimal::MAX`/`MIN` are awkward to reason about at the
// boundary). Instead each side keeps one extra FIFO bucket for market orders, and
// `candidates` always drains the opposite side's market bucket before walking its
// price-keyed levels.
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::models::order::{Order, OrderStatus, Side};

use super::OrderbookError;

/// The book-relevant projection of a resting order. The book does not keep a full
/// `Order` clone — `status` is refreshed from the store by the processor before a
/// candidate is trusted (see `OrderBook::candidates`'s doc comment).
#[derive(Debug, Clone)]
struct BookEntry {
    order_id: String,
    created_at: DateTime<Utc>,
    status: OrderStatus,
    remaining_quantity: i64,
}

#[derive(Debug, Default)]
struct PriceLevel {
    orders: VecDeque<BookEntry>,
}

impl PriceLevel {
    fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Insertion keeps strict FIFO by `created_at`, tie-broken by `id` — this matters
    /// when a caller re-adds an id that briefly left and came back (§4.B's idempotent
    /// `add`), which could otherwise race a genuinely new order with the same
    /// timestamp to the front of the queue.
    fn insert_sorted(&mut self, entry: BookEntry) {
        let pos = self
            .orders
            .iter()
            .position(|existing| {
                (existing.created_at, &existing.order_id) > (entry.created_at, &entry.order_id)
            })
            .unwrap_or(self.orders.len());
        self.orders.insert(pos, entry);
    }
}

/// A per-instrument, in-memory price-time priority order book.
#[derive(Debug)]
pub struct OrderBook {
    instrument: String,
    bids: BTreeMap<Decimal, PriceLevel>,
    asks: BTreeMap<Decimal, PriceLevel>,
    bid_market: PriceLevel,
    ask_market: PriceLevel,
    /// O(1) lookup from order id to its side, so `remove` doesn't need to scan.
    index: HashMap<String, Side>,
}

impl OrderBook {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            bid_market: PriceLevel::default(),
            ask_market: PriceLevel::default(),
            index: HashMap::new(),
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Places `order` into its side's index under its effective price. Idempotent:
    /// re-adding an already-present id first removes the old slot (§4.B).
    pub fn add(&mut self, order: &Order) -> Result<(), OrderbookError> {
        if order.instrument != self.instrument {
            return Err(OrderbookError::WrongInstrument {
                book: self.instrument.clone(),
                order: order.instrument.clone(),
            });
        }
        self.remove(&order.id);

        let entry = BookEntry {
            order_id: order.id.clone(),
            created_at: order.created_at,
            status: order.status,
            remaining_quantity: order.quantity,
        };

        let level = match (order.side, order.limit_price) {
            (Side::Buy, None) => &mut self.bid_market,
            (Side::Sell, None) => &mut self.ask_market,
            (Side::Buy, Some(price)) => self.bids.entry(price).or_default(),
            (Side::Sell, Some(price)) => self.asks.entry(price).or_default(),
        };
        level.insert_sorted(entry);
        self.index.insert(order.id.clone(), order.side);
        Ok(())
    }

    /// Removes `order_id` from whatever price level it resides in. No-op if absent.
    pub fn remove(&mut self, order_id: &str) {
        let Some(side) = self.index.remove(order_id) else {
            return;
        };
        let remove_from = |level: &mut PriceLevel| {
            if let Some(pos) = level.orders.iter().position(|e| e.order_id == order_id) {
                level.orders.remove(pos);
            }
        };
        match side {
            Side::Buy => {
                remove_from(&mut self.bid_market);
                self.bids.retain(|_, level| {
                    remove_from(level);
                    !level.is_empty()
                });
            }
            Side::Sell => {
                remove_from(&mut self.ask_market);
                self.asks.retain(|_, level| {
                    remove_from(level);
                    !level.is_empty()
                });
            }
        }
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.index.contains_key(order_id)
    }

    /// Yields opposite-side candidates for `order` in price-time priority: market
    /// orders first, then price levels walked in the direction that favours the
    /// incoming order (ascending asks for an incoming buy, descending bids for an
    /// incoming sell), pruned to prices that cross when `order` is a limit order,
    /// and FIFO within each level. Only `OPEN`/`SUBMITTED` entries are yielded —
    /// stale entries (any other status) are skipped, matching §4.B's "should be
    /// removed from the book on discovery"; the caller is expected to call `remove`
    /// for any id it discovers is no longer live.
    pub fn candidates(&self, order: &Order) -> Vec<String> {
        let (market_bucket, priced_side): (&PriceLevel, &BTreeMap<Decimal, PriceLevel>) =
            match order.side {
                Side::Buy => (&self.ask_market, &self.asks),
                Side::Sell => (&self.bid_market, &self.bids),
            };

        let mut out = Vec::new();
        for entry in &market_bucket.orders {
            if entry.status.is_restable() {
                out.push(entry.order_id.clone());
            }
        }

        let prices: Box<dyn Iterator<Item = (&Decimal, &PriceLevel)>> = match order.side {
            Side::Buy => Box::new(priced_side.iter()),
            Side::Sell => Box::new(priced_side.iter().rev()),
        };
        for (price, level) in prices {
            if !order.crosses(*price) {
                if order.order_type == crate::domain::models::order::OrderType::Limit {
                    // Prices walk away from the crossing boundary in this iteration
                    // order, so once one fails to cross, none further will either.
                    break;
                }
                continue;
            }
            for entry in &level.orders {
                if entry.status.is_restable() {
                    out.push(entry.order_id.clone());
                }
            }
        }
        out
    }

    /// Rebuilds the book from a snapshot of non-terminal orders for this instrument,
    /// e.g. after a restart. `orders` must already be sorted by `created_at` — the
    /// book is a cache — the store is truth.
    pub fn rebuild(instrument: impl Into<String>, orders: &[Order]) -> Self {
        let mut book = Self::new(instrument);
        for order in orders {
            if order.status.is_restable() {
                let _ = book.add(order);
            }
        }
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::order::OrderType;

    fn order(id: &str, side: Side, ty: OrderType, price: Option<&str>, qty: i64, t: i64) -> Order {
        Order {
            pk: None,
            id: id.to_string(),
            created_at: Utc::now() + chrono::Duration::seconds(t),
            order_type: ty,
            side,
            instrument: "DE0001234567".to_string(),
            limit_price: price.map(|p| p.parse().unwrap()),
            quantity: qty,
            status: OrderStatus::Open,
        }
    }

    #[test]
    fn fifo_within_a_price_level() {
        let mut book = OrderBook::new("DE0001234567");
        let s1 = order("s1", Side::Sell, OrderType::Limit, Some("100.00"), 5, 0);
        let s2 = order("s2", Side::Sell, OrderType::Limit, Some("100.00"), 5, 1);
        book.add(&s1).unwrap();
        book.add(&s2).unwrap();

        let buy = order("b1", Side::Buy, OrderType::Limit, Some("100.00"), 10, 2);
        let candidates = book.candidates(&buy);
        assert_eq!(candidates, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn price_time_priority_prefers_better_price() {
        let mut book = OrderBook::new("DE0001234567");
        let cheap = order("cheap", Side::Sell, OrderType::Limit, Some("99.00"), 5, 5);
        let pricey = order("pricey", Side::Sell, OrderType::Limit, Some("100.00"), 5, 0);
        book.add(&pricey).unwrap();
        book.add(&cheap).unwrap();

        let buy = order("b1", Side::Buy, OrderType::Limit, Some("100.00"), 10, 10);
        let candidates = book.candidates(&buy);
        assert_eq!(candidates, vec!["cheap".to_string(), "pricey".to_string()]);
    }

    #[test]
    fn limit_order_never_sees_prices_worse_than_its_limit() {
        let mut book = OrderBook::new("DE0001234567");
        let ask = order("ask", Side::Sell, OrderType::Limit, Some("101.00"), 5, 0);
        book.add(&ask).unwrap();

        let buy = order("b1", Side::Buy, OrderType::Limit, Some("100.00"), 10, 1);
        assert!(book.candidates(&buy).is_empty());
    }

    #[test]
    fn market_orders_match_before_any_priced_level() {
        let mut book = OrderBook::new("DE0001234567");
        let priced = order("priced", Side::Sell, OrderType::Limit, Some("50.00"), 5, 0);
        let market = order("market", Side::Sell, OrderType::Market, None, 5, 1);
        book.add(&priced).unwrap();
        book.add(&market).unwrap();

        let buy = order("b1", Side::Buy, OrderType::Market, None, 10, 2);
        let candidates = book.candidates(&buy);
        assert_eq!(candidates, vec!["market".to_string(), "priced".to_string()]);
    }

    #[test]
    fn remove_is_a_no_op_when_absent() {
        let mut book = OrderBook::new("DE0001234567");
        book.remove("missing");
        assert!(!book.contains("missing"));
    }

    #[test]
    fn re_adding_an_id_replaces_its_slot() {
        let mut book = OrderBook::new("DE0001234567");
        let mut o = order("dup", Side::Buy, OrderType::Limit, Some("100.00"), 5, 0);
        book.add(&o).unwrap();
        o.quantity = 3;
        book.add(&o).unwrap();

        let ask = order("ask", Side::Sell, OrderType::Limit, Some("100.00"), 10, 1);
        assert_eq!(book.candidates(&ask), vec!["dup".to_string()]);
    }

    #[test]
    fn terminal_status_entries_are_skipped() {
        let mut book = OrderBook::new("DE0001234567");
        let mut stale = order("stale", Side::Sell, OrderType::Limit, Some("100.00"), 5, 0);
        stale.status = OrderStatus::Matched;
        book.add(&stale).unwrap();

        let buy = order("b1", Side::Buy, OrderType::Limit, Some("100.00"), 10, 1);
        assert!(book.candidates(&buy).is_empty());
    }
}
