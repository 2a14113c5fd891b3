//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// `BookRegistry` owns one `OrderBook` per instrument, created lazily on first sight.
// This is the natural seam for future instrument sharding (one worker per instrument,
// each owning its own sub-book): the registry already isolates state per instrument,
// so sharding only needs to change how ids are routed to workers, not how state is
// structured.
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use super::OrderBook;

#[derive(Debug, Default)]
pub struct BookRegistry {
    books: HashMap<String, OrderBook>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book_mut(&mut self, instrument: &str) -> &mut OrderBook {
        self.books
            .entry(instrument.to_string())
            .or_insert_with(|| OrderBook::new(instrument))
    }

    pub fn book(&self, instrument: &str) -> Option<&OrderBook> {
        self.books.get(instrument)
    }

    /// Whether a book for `instrument` has been loaded into this registry yet — used
    /// by the processor to decide whether an instrument needs its resting orders
    /// pulled from the store before the first pass touches it. The book is a cache
    /// over the store, not a source of truth, so it can be rebuilt at any time.
    pub fn has_book(&self, instrument: &str) -> bool {
        self.books.contains_key(instrument)
    }

    /// Installs an already-built book (e.g. from `OrderBook::rebuild`), replacing any
    /// existing book for the same instrument.
    pub fn insert_book(&mut self, book: OrderBook) {
        self.books.insert(book.instrument().to_string(), book);
    }

    /// Defensive removal used when the processor can't tell which instrument an id
    /// belongs to (e.g. the store has no record of it at all) — scans every book
    /// rather than skipping the removal, since a stale book entry left behind would
    /// keep surfacing as a match candidate forever.
    pub fn remove_from_all(&mut self, order_id: &str) {
        for book in self.books.values_mut() {
            book.remove(order_id);
        }
    }
}
