//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// | Module      | Description                                                               |
// |-------------|-----------------------------------------------------------------------------|
// | domain      | Order/Match types, the order book, and the pure matching engine             |
// | store       | Transactional persistence (`OrderStore`), Postgres and in-memory backends   |
// | exchange    | Upstream placement contract (`ExchangeClient`), HTTP and scripted backends  |
// | processor   | The single-consumer worker driving the book/match/placement pass           |
// | facade      | Validates and enqueues new submissions, the seam the API calls into        |
// | api         | The HTTP surface: axum routes, DTOs, error mapping                         |
// | config      | Environment-driven settings                                                 |
//--------------------------------------------------------------------------------------------------

pub mod api;
pub mod config;
pub mod domain;
pub mod exchange;
pub mod facade;
pub mod processor;
pub mod store;

pub use config::Config;
pub use domain::models::{Match, Order};
pub use domain::models::order::{OrderStatus, OrderType, OrderValidationError, Side};
pub use domain::services::matching_engine::{run_match, Fill, MatchOutcome};
pub use domain::services::orderbook::{BookRegistry, OrderBook, OrderbookError};
pub use exchange::{ExchangeClient, HttpExchangeClient, PlacementOutcome, ScriptedExchangeClient};
pub use facade::{OrderSubmission, SubmissionError, SubmissionFacade};
pub use store::{InMemoryOrderStore, OrderStore, PgOrderStore, StoreError};
