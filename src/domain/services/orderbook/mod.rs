use thiserror::Error;

pub mod book;
pub mod registry;

pub use book::OrderBook;
pub use registry::BookRegistry;

/// Errors that can occur within the orderbook service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderbookError {
    /// Order is for a different instrument than this book manages.
    #[error("order is for wrong instrument (book is {book}, order is {order})")]
    WrongInstrument { book: String, order: String },
}
