//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// The upstream exchange client contract: a single outbound call with a three-valued
// result. The core never assumes idempotence and calls it at most once per processor
// pass per order.
//--------------------------------------------------------------------------------------------------

pub mod http_client;
pub mod scripted;

pub use http_client::HttpExchangeClient;
pub use scripted::ScriptedExchangeClient;

use async_trait::async_trait;

use crate::domain::models::Order;

/// Marker string carried by a retryable placement failure.
pub const TRANSIENT_MARKER: &str = "Connection not available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    Ok,
    Transient(String),
    Permanent(String),
}

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn place_order(&self, order: &Order) -> PlacementOutcome;
}
